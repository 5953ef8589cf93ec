pub mod install;
pub mod run;
pub mod stop;

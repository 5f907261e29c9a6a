pub mod synthetic_run;

pub mod larson;
pub mod micro;
pub mod shbench;
pub mod threadtest;

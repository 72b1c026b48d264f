//! Scenario loading and saving: the document schema, its validation, and
//! the bridge between documents and a populated simulation world.

mod build;
mod file;

pub use build::{build_scenario, save_scenario, ScenarioParams};
pub use file::{
    load_scenario_file, validate, write_scenario_file, DeliverySpec, DroneSpec, ScenarioError,
    ScenarioFile, ZoneSpec, PRIORITY_MAX, PRIORITY_MIN,
};

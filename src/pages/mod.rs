pub mod configurations;
pub mod create_experiment;
pub mod dashboard;
pub mod experiment_details;
pub mod experiments;
pub mod functions;
pub mod login;
pub mod register;

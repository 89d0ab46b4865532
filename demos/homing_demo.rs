//! Closed-loop homing example.
//!
//! Loads a stage configuration, homes one axis of the simulated stage from a
//! far position, then shows how overshoots walk the step size down.
//!
//! Runs without hardware against `SimulatedStage`.

use std::cell::RefCell;

use smart_stage::{
    Axis, DriveConfig, Hertz, HomingOutcome, Millimetres, SimulatedStage, SmartStage,
    StepSchedule, Volts,
};

/// Delay provider backed by the OS scheduler.
struct StdDelay;

impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }
}

const CONFIG: &str = r#"
name = "demo_stage"

[homing]
initial_step_size = 40
tolerance_mm = 0.001
settling_delay_ms = 1

[axes.x]
closed_loop = { voltage = 40.0, frequency = 100.0 }
open_loop = { voltage = 60.0, frequency = 200.0 }
"#;

fn main() {
    println!("=== Closed-Loop Homing Example ===\n");

    let config = smart_stage::parse_config(CONFIG).expect("Failed to parse config");
    println!("Configuration '{}' validated", config.name);

    let schedule = StepSchedule::new(config.homing_for(Axis::X).initial_step_size)
        .expect("Step size must be non-zero");
    println!("Step schedule for X: {:?}", schedule.as_slice());

    let sim = RefCell::new(
        SimulatedStage::from_drive(DriveConfig::new(Volts(60.0), Hertz(200.0)))
            .at(Axis::X, Millimetres(4.4152)),
    );

    let mut stage = SmartStage::builder()
        .from_config(&config)
        .actuator(&sim)
        .sensor(&sim)
        .delay(StdDelay)
        .build()
        .expect("Failed to build stage");

    println!("\n=== Homing {} X to 3.3 mm ===", stage.name());
    println!("Start: {} mm", stage.position(Axis::X).expect("Read failed").0);

    match stage.move_to_with_drive(Axis::X, Millimetres(3.3)) {
        Ok(HomingOutcome::Arrived {
            position,
            step_size,
        }) => println!("Arrived at {} mm with {}-step moves", position.0, step_size),
        Ok(HomingOutcome::Failed { position }) => {
            println!("No resolution landed; stopped at {} mm", position.0)
        }
        Err(e) => println!("Homing error: {}", e),
    }

    let sim = sim.borrow();
    println!("Step calls: {}, reads: {}, pulses: {}", sim.step_calls(), sim.read_calls(), sim.pulses());
    println!("Drive restored to {} V / {} Hz", sim.drive(Axis::X).voltage.0, sim.drive(Axis::X).frequency.0);

    println!("\n=== Example Complete ===");
}

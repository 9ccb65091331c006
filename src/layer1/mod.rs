// Layer 1 - Reading Source
// Simulated temperature sensor feeding the dispatcher

pub mod sensor;

pub use sensor::{ReadingGenerator, ScriptedGenerator, SensorStats, TemperatureSensor, UniformGenerator};

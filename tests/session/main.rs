//! Integration tests for Layer 2: the interaction engine.
//!
//! Full scenarios driving the engine through the default command surfaces,
//! including suspension and persistence across a simulated server restart.

mod flow;

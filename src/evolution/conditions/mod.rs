/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Conditions used to accept or reject structures

mod energy;

pub use energy::SmallEnergyAtoms;

pub mod activities;
pub mod conflicts;
pub mod registrations;
pub mod volunteers;
pub mod warnings;

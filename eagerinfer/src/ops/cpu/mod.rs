pub mod arithmetic;
pub mod broadcast;
pub mod casting;
pub mod elementwise;
pub mod movement;
pub mod numerical;
pub mod registry;

// handlers/mod.rs - HTTP handlers grouped by who may reach them
//
// public   → no session needed (/, /health, /denied)
// overview → role landing pages (/admin, /staff, /trainer)
// pages    → table and form endpoints for each managed entity
//
// Access control is not done here: the route guard middleware has already
// run by the time any of these handlers is called.

pub mod overview;
pub mod pages;
pub mod public;

pub mod activity;
pub mod admin;
pub mod auth;
pub mod budget;
pub mod city;
pub mod stop;
pub mod trip;
pub mod user;

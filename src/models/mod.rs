pub mod activity;
pub mod city;
pub mod stop;
pub mod trip;
pub mod user;

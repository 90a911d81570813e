pub mod budget_service;
pub mod clone_service;
pub mod ownership_service;
pub mod sharing_service;

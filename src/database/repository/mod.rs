//! Repositories: storage access per entity.
//!
//! Config-style documents (groups, users, bot profile) go through a
//! read-through Moka cache; every counter mutation is a Mongo `$inc` /
//! `$addToSet` / `$pull` so concurrent deliveries never lose updates.

mod activity_repo;
mod bot_repo;
mod group_repo;
mod user_repo;

pub use activity_repo::ActivityRepo;
pub use bot_repo::BotRepo;
pub use group_repo::GroupRepo;
pub use user_repo::UserRepo;

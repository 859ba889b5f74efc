// src/services/test_fixtures.rs
//
// Shared schemas for service tests: a blog (users, posts, comments) and an
// orchard (trees, leaves).

use std::sync::Arc;

use crate::db::{create_connection_pool, get_connection, initialize_database, StoreConfig};
use crate::domain::{EntityType, FieldType};
use crate::events::EventBus;
use crate::registry::{AssociationRegistry, RegistryBuilder};
use crate::repositories::{RecordRepository, SqliteRecordRepository};
use crate::services::{AssociationService, RecordService};

pub fn blog_registry() -> AssociationRegistry {
    let mut builder = RegistryBuilder::new();
    builder
        .declare_entity_type(EntityType::new("User").field("name", FieldType::Text))
        .unwrap()
        .declare_entity_type(
            EntityType::new("Post")
                .field("title", FieldType::Text)
                .field("body", FieldType::Text)
                .field("user_id", FieldType::Integer),
        )
        .unwrap()
        .declare_entity_type(
            EntityType::new("Comment")
                .field("comment", FieldType::Text)
                .field("post_id", FieldType::Integer)
                .field("user_id", FieldType::Integer),
        )
        .unwrap();

    builder
        .owns_many("User", "posts", "Post", "user_id")
        .unwrap()
        .owns_many("User", "comments_left", "Comment", "user_id")
        .unwrap()
        .indirect_many("User", "comments_received", "Comment", "posts", "comments")
        .unwrap()
        .indirect_many("User", "commenters", "User", "posts", "commenters")
        .unwrap()
        .belongs_to("Post", "user", "User", "user_id")
        .unwrap()
        .owns_many("Post", "comments", "Comment", "post_id")
        .unwrap()
        .indirect_many("Post", "commenters", "User", "comments", "user")
        .unwrap()
        .belongs_to("Comment", "post", "Post", "post_id")
        .unwrap()
        .belongs_to("Comment", "user", "User", "user_id")
        .unwrap();

    builder.build().unwrap()
}

pub fn orchard_registry() -> AssociationRegistry {
    let mut builder = RegistryBuilder::new();
    builder
        .declare_entity_type(EntityType::new("Tree"))
        .unwrap()
        .declare_entity_type(
            EntityType::new("Leaf")
                .field_with_default("diseased", FieldType::Boolean, false)
                .field("tree_id", FieldType::Integer),
        )
        .unwrap();

    builder
        .owns_many("Tree", "leaves", "Leaf", "tree_id")
        .unwrap()
        .belongs_to("Leaf", "tree", "Tree", "tree_id")
        .unwrap();

    builder.build().unwrap()
}

/// Services wired over a fresh in-memory store
pub struct Harness {
    pub records: RecordService,
    pub associations: AssociationService,
    pub event_bus: Arc<EventBus>,
}

pub fn harness(registry: AssociationRegistry) -> Harness {
    let pool = create_connection_pool(&StoreConfig::in_memory()).unwrap();
    {
        let conn = get_connection(&pool).unwrap();
        initialize_database(&conn).unwrap();
    }

    let registry = Arc::new(registry);
    let repo: Arc<dyn RecordRepository> = Arc::new(SqliteRecordRepository::new(Arc::new(pool)));
    let event_bus = Arc::new(EventBus::new());

    Harness {
        records: RecordService::new(registry.clone(), repo.clone(), event_bus.clone()),
        associations: AssociationService::new(registry, repo),
        event_bus,
    }
}

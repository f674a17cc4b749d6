use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema, ID};

#[derive(Clone)]
pub struct User {
    id: ID,
    name: Option<String>,
    /// Reading the name of a private user fails.
    private: bool,
}

fn users() -> Vec<User> {
    vec![
        User {
            id: ID("1".to_string()),
            name: Some("Uri Goldshtein".to_string()),
            private: false,
        },
        User {
            id: ID("2".to_string()),
            name: Some("Dotan Simha".to_string()),
            private: true,
        },
        User {
            id: ID("3".to_string()),
            name: Some("Kamil Kisiela".to_string()),
            private: true,
        },
    ]
}

#[Object]
impl User {
    async fn id(&self) -> ID {
        self.id.clone()
    }

    async fn name(&self) -> async_graphql::Result<Option<String>> {
        if self.private {
            return Err(format!("User {} is private", self.id.as_str()).into());
        }
        Ok(self.name.clone())
    }
}

pub struct Query;

#[Object(extends = true)]
impl Query {
    async fn me(&self) -> Option<User> {
        users().into_iter().next()
    }

    #[graphql(entity)]
    async fn find_user_by_id(&self, id: ID) -> Option<User> {
        users().into_iter().find(|user| user.id == id)
    }
}

pub fn get_subgraph() -> Schema<Query, EmptyMutation, EmptySubscription> {
    Schema::build(Query, EmptyMutation, EmptySubscription)
        .enable_federation()
        .finish()
}

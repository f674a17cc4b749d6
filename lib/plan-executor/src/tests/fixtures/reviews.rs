use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema, SimpleObject, ID};

#[derive(SimpleObject, Clone)]
pub struct User {
    id: ID,
}

#[derive(SimpleObject, Clone)]
pub struct Review {
    id: ID,
    body: String,
    author: Option<User>,
}

fn reviews() -> Vec<Review> {
    vec![
        Review {
            id: ID("1".to_string()),
            body: "Love it!".to_string(),
            author: Some(User { id: ID("2".to_string()) }),
        },
        Review {
            id: ID("2".to_string()),
            body: "Too expensive.".to_string(),
            author: Some(User { id: ID("3".to_string()) }),
        },
        Review {
            id: ID("3".to_string()),
            body: "Could be better.".to_string(),
            author: Some(User { id: ID("1".to_string()) }),
        },
        Review {
            id: ID("4".to_string()),
            body: "Anonymous rant.".to_string(),
            author: None,
        },
    ]
}

pub struct Query;

#[Object(extends = true)]
impl Query {
    async fn top_reviews(&self, #[graphql(default = 5)] first: Option<i32>) -> Vec<Review> {
        let first = first.unwrap_or(5).max(0) as usize;
        reviews().into_iter().take(first).collect()
    }
}

pub fn get_subgraph() -> Schema<Query, EmptyMutation, EmptySubscription> {
    Schema::build(Query, EmptyMutation, EmptySubscription)
        .enable_federation()
        .finish()
}

use std::time::{SystemTime, UNIX_EPOCH};

use trailtalk_client::{ClientError, NewPost, PostUpdate, TrailTalkClient};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

#[tokio::test]
#[ignore = "requires running HTTP server and MongoDB"]
async fn http_smoke_flow() {
    let base_url =
        std::env::var("TRAILTALK_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:5002".to_string());
    let client = TrailTalkClient::new(base_url).expect("client must build");

    let suffix = unique_suffix();
    let user_id = format!("hiker_{suffix}");
    let secret_key = format!("secret_{suffix}");

    let created = client
        .create_post(&NewPost {
            title: "smoke title".to_string(),
            user_id: user_id.clone(),
            secret_key: secret_key.clone(),
            tags: vec!["Adventure".to_string()],
            ..NewPost::default()
        })
        .await
        .expect("create_post must succeed");
    assert_eq!(created.title, "smoke title");
    assert_eq!(created.upvotes, 0);

    let fetched = client
        .get_post(&created.id)
        .await
        .expect("get_post must succeed");
    assert_eq!(fetched.id, created.id);

    let listed = client.list_posts().await.expect("list_posts must succeed");
    assert!(listed.iter().any(|post| post.id == created.id));

    let upvoted = client
        .upvote_post(&created.id)
        .await
        .expect("upvote must succeed");
    assert_eq!(upvoted.upvotes, 1);

    let comment = client
        .add_comment(&created.id, &user_id, "smoke comment")
        .await
        .expect("comment must succeed");
    assert_eq!(comment.comment, "smoke comment");

    let forbidden = client
        .update_post(&PostUpdate {
            id: created.id.clone(),
            secret_key: "wrong".to_string(),
            title: Some("nope".to_string()),
            ..PostUpdate::default()
        })
        .await;
    assert!(matches!(forbidden, Err(ClientError::Forbidden(_))));

    let updated = client
        .update_post(&PostUpdate {
            id: created.id.clone(),
            secret_key: secret_key.clone(),
            title: Some("smoke title updated".to_string()),
            ..PostUpdate::default()
        })
        .await
        .expect("update_post must succeed");
    assert_eq!(updated.title, "smoke title updated");
    assert_eq!(updated.comments.len(), 1);

    let message = client
        .delete_post(&created.id, &secret_key)
        .await
        .expect("delete_post must succeed");
    assert_eq!(message, "Post deleted");

    let after_delete = client.get_post(&created.id).await;
    assert!(matches!(after_delete, Err(ClientError::NotFound(_))));
}

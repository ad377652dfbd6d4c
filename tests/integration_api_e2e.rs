use std::time::{SystemTime, UNIX_EPOCH};
use serde_json::json;
use once_cell::sync::Lazy;
use tokio_postgres::NoTls;

// Shared test context. Suites run against a live server with a
// reachable DATABASE_URL, matching how the service is deployed.
struct TestContext {
    client: reqwest::Client,
    base_url: String,
}

static DATABASE_URL: Lazy<String> = Lazy::new(|| {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests")
});

async fn get_db_client() -> tokio_postgres::Client {
    let (client, connection) = tokio_postgres::connect(&DATABASE_URL, NoTls)
        .await
        .unwrap();
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("database connection error: {}", e);
        }
    });
    client
}

impl TestContext {
    fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .unwrap(),
            base_url: "http://127.0.0.1:3000".to_string(),
        }
    }

    fn bare() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "http://127.0.0.1:3000".to_string(),
        }
    }

    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    async fn login(&self, external_id: &str) -> serde_json::Value {
        let response = self
            .client
            .post(format!("{}/api/v1/auth/callback", self.base_url))
            .json(&json!({
                "external_id": external_id,
                "name": "Test Developer",
                "email": format!("{}@example.com", external_id),
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 201, "Login failed");
        response.json().await.unwrap()
    }

    async fn create_game(&self, name: &str) -> serde_json::Value {
        let response = self
            .client
            .post(format!("{}/api/v1/games", self.base_url))
            .json(&json!({ "name": name, "description": "integration fixture" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 201, "Game creation failed");
        response.json().await.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_login_me_and_logout_lifecycle() {
        let context = TestContext::new();
        let external_id = format!("U_LIFE_{}", TestContext::get_timestamp());

        let login_body = context.login(&external_id).await;
        assert_eq!(login_body["user"]["external_id"], external_id.as_str());
        let token = login_body["token"].as_str().unwrap();
        assert_eq!(token.len(), 64);

        // Cookie-carried credential resolves to the identity.
        let me_response = context
            .client
            .get(format!("{}/api/v1/auth/me", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(me_response.status().as_u16(), 200);
        let me_body: Value = me_response.json().await.unwrap();
        assert_eq!(me_body["user"]["external_id"], external_id.as_str());

        // Logout revokes the session server-side.
        let logout_response = context
            .client
            .post(format!("{}/api/v1/auth/logout", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(logout_response.status().as_u16(), 200);

        // The same token is dead now, cookie or bearer.
        let bare = TestContext::bare();
        let me_after = bare
            .client
            .get(format!("{}/api/v1/auth/me", bare.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .unwrap();
        assert_eq!(me_after.status().as_u16(), 401);

        // Second logout with the dead token does not error.
        let logout_again = bare
            .client
            .post(format!("{}/api/v1/auth/logout", bare.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .unwrap();
        assert_eq!(logout_again.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_bearer_header_is_a_full_credential() {
        let context = TestContext::new();
        let external_id = format!("U_BEARER_{}", TestContext::get_timestamp());
        let login_body = context.login(&external_id).await;
        let token = login_body["token"].as_str().unwrap().to_string();

        // A cookie-less client presenting only the bearer header.
        let bare = TestContext::bare();
        let me_response = bare
            .client
            .get(format!("{}/api/v1/auth/me", bare.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .unwrap();
        assert_eq!(me_response.status().as_u16(), 200);
        let me_body: Value = me_response.json().await.unwrap();
        assert_eq!(me_body["user"]["external_id"], external_id.as_str());
    }

    #[tokio::test]
    async fn test_unauthenticated_requests_get_401_before_body_parsing() {
        let bare = TestContext::bare();

        // No credential at all.
        let response = bare
            .client
            .get(format!("{}/api/v1/games", bare.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Authentication required");

        // A token nobody issued.
        let response = bare
            .client
            .get(format!("{}/api/v1/games", bare.base_url))
            .header("Authorization", format!("Bearer {}", "f".repeat(64)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401);

        // Garbage body on a guarded route: the guard must answer before
        // the payload is ever parsed, so this is 401, not 400.
        let response = bare
            .client
            .post(format!("{}/api/v1/games", bare.base_url))
            .header("Content-Type", "application/json")
            .body("{not json at all")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_before_purge() {
        let context = TestContext::new();
        let external_id = format!("U_EXPIRED_{}", TestContext::get_timestamp());
        let login_body = context.login(&external_id).await;
        let token = login_body["token"].as_str().unwrap().to_string();

        // Age the session past its expiry without deleting it. The row
        // sits in storage exactly as it would between purge runs.
        let db = get_db_client().await;
        let updated = db
            .execute(
                "UPDATE sessions SET expires_at = NOW() - INTERVAL '1 hour' WHERE token = $1",
                &[&token],
            )
            .await
            .unwrap();
        assert_eq!(updated, 1);

        // Validity is enforced at read time: the bearer path rejects it.
        let bare = TestContext::bare();
        let me_bearer = bare
            .client
            .get(format!("{}/api/v1/auth/me", bare.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .unwrap();
        assert_eq!(me_bearer.status().as_u16(), 401);
        let body: Value = me_bearer.json().await.unwrap();
        assert_eq!(body["message"], "Authentication required");

        // The cookie path is just as dead.
        let me_cookie = context
            .client
            .get(format!("{}/api/v1/auth/me", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(me_cookie.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn test_session_for_deleted_user_fails_closed() {
        let context = TestContext::new();
        let external_id = format!("U_GONE_{}", TestContext::get_timestamp());
        let login_body = context.login(&external_id).await;
        let token = login_body["token"].as_str().unwrap().to_string();

        let db = get_db_client().await;
        let removed = db
            .execute("DELETE FROM users WHERE external_id = $1", &[&external_id])
            .await
            .unwrap();
        assert_eq!(removed, 1);

        // The session row is still live and unexpired, but it points at
        // nobody. It must never resolve to an identity.
        let bare = TestContext::bare();
        let me_response = bare
            .client
            .get(format!("{}/api/v1/auth/me", bare.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .unwrap();
        assert_eq!(me_response.status().as_u16(), 401);
        let body: Value = me_response.json().await.unwrap();
        assert_eq!(body["message"], "Authentication required");
    }

    #[tokio::test]
    async fn test_game_crud_and_pagination() {
        let context = TestContext::new();
        let timestamp = TestContext::get_timestamp();
        let external_id = format!("U_CRUD_{}", timestamp);
        context.login(&external_id).await;

        let created = context.create_game(&format!("Game {}", timestamp)).await;
        let game_id = created["game"]["id"].as_str().unwrap().to_string();

        // Read it back.
        let get_response = context
            .client
            .get(format!("{}/api/v1/games/{}", context.base_url, game_id))
            .send()
            .await
            .unwrap();
        assert_eq!(get_response.status().as_u16(), 200);

        // Partial update.
        let update_response = context
            .client
            .put(format!("{}/api/v1/games/{}", context.base_url, game_id))
            .json(&json!({ "description": "updated description" }))
            .send()
            .await
            .unwrap();
        assert_eq!(update_response.status().as_u16(), 200);
        let updated: Value = update_response.json().await.unwrap();
        assert_eq!(updated["game"]["description"], "updated description");

        // Empty update set is rejected.
        let empty_update = context
            .client
            .put(format!("{}/api/v1/games/{}", context.base_url, game_id))
            .json(&json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(empty_update.status().as_u16(), 400);

        // Listing clamps the page size and reports totals.
        let list_response = context
            .client
            .get(format!(
                "{}/api/v1/games?page=1&limit=9999",
                context.base_url
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(list_response.status().as_u16(), 200);
        let list_body: Value = list_response.json().await.unwrap();
        assert_eq!(list_body["pagination"]["limit"], 50);
        assert_eq!(list_body["pagination"]["total"], 1);

        // Delete, then the game is gone.
        let delete_response = context
            .client
            .delete(format!("{}/api/v1/games/{}", context.base_url, game_id))
            .send()
            .await
            .unwrap();
        assert_eq!(delete_response.status().as_u16(), 200);

        let gone = context
            .client
            .get(format!("{}/api/v1/games/{}", context.base_url, game_id))
            .send()
            .await
            .unwrap();
        assert_eq!(gone.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn test_ownership_is_a_uniform_404_for_non_owners() {
        let timestamp = TestContext::get_timestamp();

        let owner = TestContext::new();
        owner.login(&format!("U_OWNER_{}", timestamp)).await;
        let created = owner.create_game(&format!("Private {}", timestamp)).await;
        let game_id = created["game"]["id"].as_str().unwrap().to_string();

        let intruder = TestContext::new();
        intruder.login(&format!("U_INTRUDER_{}", timestamp)).await;

        // Reads, writes, and deletes all answer 404, same as a game that
        // does not exist.
        let get_response = intruder
            .client
            .get(format!("{}/api/v1/games/{}", intruder.base_url, game_id))
            .send()
            .await
            .unwrap();
        assert_eq!(get_response.status().as_u16(), 404);

        let update_response = intruder
            .client
            .put(format!("{}/api/v1/games/{}", intruder.base_url, game_id))
            .json(&json!({ "name": "hijacked" }))
            .send()
            .await
            .unwrap();
        assert_eq!(update_response.status().as_u16(), 404);

        let delete_response = intruder
            .client
            .delete(format!("{}/api/v1/games/{}", intruder.base_url, game_id))
            .send()
            .await
            .unwrap();
        assert_eq!(delete_response.status().as_u16(), 404);

        // The owner still succeeds.
        let owner_get = owner
            .client
            .get(format!("{}/api/v1/games/{}", owner.base_url, game_id))
            .send()
            .await
            .unwrap();
        assert_eq!(owner_get.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_player_upsert_merges_data_and_accumulates_playtime() {
        let context = TestContext::new();
        let timestamp = TestContext::get_timestamp();
        context.login(&format!("U_PLAYERS_{}", timestamp)).await;
        let created = context.create_game(&format!("Players {}", timestamp)).await;
        let game_id = created["game"]["id"].as_str().unwrap().to_string();

        let first = context
            .client
            .post(format!(
                "{}/api/v1/games/{}/players",
                context.base_url, game_id
            ))
            .json(&json!({
                "player_id": "hero-1",
                "game_data": { "level": 1, "hp": 100 },
                "play_time": 60,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(first.status().as_u16(), 201);

        let second = context
            .client
            .post(format!(
                "{}/api/v1/games/{}/players",
                context.base_url, game_id
            ))
            .json(&json!({
                "player_id": "hero-1",
                "game_data": { "level": 2 },
                "play_time": 30,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(second.status().as_u16(), 200);
        let body: Value = second.json().await.unwrap();
        assert_eq!(body["player"]["game_data"]["level"], 2);
        assert_eq!(body["player"]["game_data"]["hp"], 100);
        assert_eq!(body["player"]["total_play_time"], 90);

        // Unknown sort columns are rejected, not interpolated.
        let bad_sort = context
            .client
            .get(format!(
                "{}/api/v1/games/{}/players?sort_by=drop_table",
                context.base_url, game_id
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(bad_sort.status().as_u16(), 400);

        let listing = context
            .client
            .get(format!(
                "{}/api/v1/games/{}/players",
                context.base_url, game_id
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(listing.status().as_u16(), 200);
        let listing_body: Value = listing.json().await.unwrap();
        assert_eq!(listing_body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn test_saves_merge_and_schema_summary() {
        let context = TestContext::new();
        let timestamp = TestContext::get_timestamp();
        context.login(&format!("U_SAVES_{}", timestamp)).await;
        let created = context.create_game(&format!("Saves {}", timestamp)).await;
        let game_id = created["game"]["id"].as_str().unwrap().to_string();

        let write = context
            .client
            .post(format!("{}/api/v1/games/{}/data", context.base_url, game_id))
            .json(&json!({
                "player_external_id": "U_PLAYER_X",
                "save_name": "slot-1",
                "save_data": { "level": 4, "name": "run one" },
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(write.status().as_u16(), 200);

        // Same slot again: shallow merge.
        let merge = context
            .client
            .post(format!("{}/api/v1/games/{}/data", context.base_url, game_id))
            .json(&json!({
                "player_external_id": "U_PLAYER_X",
                "save_name": "slot-1",
                "save_data": { "level": 5 },
            }))
            .send()
            .await
            .unwrap();
        let merged: Value = merge.json().await.unwrap();
        assert_eq!(merged["save"]["save_data"]["level"], 5);
        assert_eq!(merged["save"]["save_data"]["name"], "run one");

        let listing = context
            .client
            .get(format!(
                "{}/api/v1/games/{}/data?player_external_id=U_PLAYER_X",
                context.base_url, game_id
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(listing.status().as_u16(), 200);
        let listing_body: Value = listing.json().await.unwrap();
        assert_eq!(listing_body["data"].as_array().unwrap().len(), 1);

        let schema = context
            .client
            .get(format!(
                "{}/api/v1/games/{}/data/schema",
                context.base_url, game_id
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(schema.status().as_u16(), 200);
        let schema_body: Value = schema.json().await.unwrap();
        assert_eq!(schema_body["fields"]["level"], "number");
        assert_eq!(schema_body["fields"]["name"], "string");
    }

    #[tokio::test]
    async fn test_api_key_issue_and_public_validation() {
        let context = TestContext::new();
        let timestamp = TestContext::get_timestamp();
        context.login(&format!("U_KEYS_{}", timestamp)).await;
        let created = context.create_game(&format!("Keys {}", timestamp)).await;
        let game_id = created["game"]["id"].as_str().unwrap().to_string();

        let issued = context
            .client
            .put(format!("{}/api/v1/games/{}/keys", context.base_url, game_id))
            .send()
            .await
            .unwrap();
        assert_eq!(issued.status().as_u16(), 201);
        let issued_body: Value = issued.json().await.unwrap();
        let key = issued_body["key"].as_str().unwrap().to_string();
        assert_eq!(key.len(), 64);

        // Validation is public: no session required.
        let bare = TestContext::bare();
        let valid = bare
            .client
            .post(format!(
                "{}/api/v1/games/{}/keys/validate",
                bare.base_url, game_id
            ))
            .json(&json!({ "key": key }))
            .send()
            .await
            .unwrap();
        assert_eq!(valid.status().as_u16(), 200);
        let valid_body: Value = valid.json().await.unwrap();
        assert_eq!(valid_body["message"], "Valid");

        let invalid = bare
            .client
            .post(format!(
                "{}/api/v1/games/{}/keys/validate",
                bare.base_url, game_id
            ))
            .json(&json!({ "key": "0".repeat(64) }))
            .send()
            .await
            .unwrap();
        assert_eq!(invalid.status().as_u16(), 404);
    }
}

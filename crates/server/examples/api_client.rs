//! Walks through the songbook API against a running server.
//!
//! ```sh
//! SONGS_SERVER__BACKEND=memory cargo run -p songbook-server &
//! cargo run -p songbook-server --example api_client
//! ```

use reqwest::Client;
use serde_json::json;

const SERVER_URL: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("2. Count:");
    let resp = client.get(format!("{SERVER_URL}/count")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("3. Fetch song 1:");
    let resp = client.get(format!("{SERVER_URL}/song/1")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // reqwest follows redirects by default; 302 is how duplicates are reported
    let no_redirect = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    println!("4. Create a song:");
    let resp = no_redirect
        .post(format!("{SERVER_URL}/song"))
        .json(&json!({
            "id": 9999,
            "title": "New",
            "lyrics": "A new verse"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("5. Create it again (duplicate):");
    let resp = no_redirect
        .post(format!("{SERVER_URL}/song"))
        .json(&json!({
            "id": 9999,
            "title": "New",
            "lyrics": "A new verse"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("6. Update it:");
    let resp = client
        .put(format!("{SERVER_URL}/song/9999"))
        .json(&json!({
            "title": "New2",
            "lyrics": "A new verse"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("7. Delete it:");
    let resp = client
        .delete(format!("{SERVER_URL}/song/9999"))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!();

    println!("8. Fetch it after delete:");
    let resp = client.get(format!("{SERVER_URL}/song/9999")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);

    Ok(())
}

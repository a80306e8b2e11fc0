use mela_backend_api::{BackendApiError, Client, Request};

#[tokio::main]
pub async fn main() -> Result<(), BackendApiError> {
    let client = Client::new("https://backend.example.com");

    let req = Request::auth().login("somchai", "secret");

    let _res = client.send(req).await?;
    Ok(())
}

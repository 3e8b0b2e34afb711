#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lan_share::{DeviceRegistry, TransferStore};
    use rocket::http::{ContentType, Header, Status};
    use rocket::local::asynchronous::{Client, LocalResponse};
    use serde_json::{json, Value};
    use server::AppState;
    use tempfile::TempDir;

    const BOUNDARY: &str = "X-SHARE-TEST-BOUNDARY";
    const HOST: &str = "share.local:8080";

    /// Helper to start a server against a temporary uploads directory
    async fn create_test_client() -> (Client, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = TransferStore::new(temp_dir.path().join("uploads"))
            .await
            .expect("can't create transfer store")
            .with_max_file_size(1024);
        let registry = DeviceRegistry::new(10);
        let state = AppState::new(Arc::new(store), Arc::new(registry)).expect("state");

        let figment = rocket::Config::figment()
            .merge(("log_level", "off"))
            .merge(("temp_dir", temp_dir.path().join("tmp")));
        std::fs::create_dir_all(temp_dir.path().join("tmp")).unwrap();

        let client = Client::tracked(server::build(state, figment))
            .await
            .expect("valid rocket instance");
        (client, temp_dir)
    }

    fn multipart(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        for (filename, mime, data) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, filename, mime
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    async fn upload(client: &Client, pin: &str) -> Value {
        let body = multipart(
            &[("category", "images"), ("pin", pin)],
            &[
                ("beach.jpg", "image/jpeg", &b"jpegbytes"[..]),
                ("notes.txt", "text/plain", &b"hello there"[..]),
            ],
        );
        let response = client
            .post("/uploadFile")
            .header(ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY)))
            .header(Header::new("Host", HOST))
            .body(body)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        response.into_json::<Value>().await.expect("upload response")
    }

    fn field<'a>(value: &'a Value, key: &str) -> &'a str {
        value[key].as_str().expect("string field")
    }

    async fn get<'c>(client: &'c Client, uri: String) -> LocalResponse<'c> {
        client.get(uri).dispatch().await
    }

    #[rocket::async_test]
    async fn test_upload_meta_and_download() {
        let (client, _temp_dir) = create_test_client().await;
        let uploaded = upload(&client, "").await;

        let id = field(&uploaded, "id");
        let token = field(&uploaded, "token");
        assert_eq!(id.len(), 24);
        assert_eq!(token.len(), 64);
        assert_eq!(uploaded["category"], "photos");
        assert_eq!(uploaded["categoryLabel"], "Photos");
        assert_eq!(uploaded["requiresPin"], false);
        assert_eq!(uploaded["files"].as_array().unwrap().len(), 2);

        let share_path = format!("/meta?id={}&token={}", id, token);
        assert_eq!(field(&uploaded, "shareUrl"), format!("http://{}{}", HOST, share_path));
        let shared = get(&client, share_path).await;
        assert_eq!(shared.status(), Status::Ok);

        let meta = get(&client, format!("/meta?id={}&token={}", id, token)).await;
        assert_eq!(meta.status(), Status::Ok);
        let meta = meta.into_json::<Value>().await.unwrap();
        assert_eq!(meta["files"][0]["name"], "beach.jpg");
        assert_eq!(meta["files"][1]["size"], 11);

        let file_url = field(&uploaded["files"][1], "url").to_string();
        let response = get(&client, file_url).await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.headers().get_one("Content-Type"), Some("text/plain"));
        assert_eq!(
            response.headers().get_one("Content-Disposition"),
            Some("attachment; filename=\"notes.txt\"; filename*=UTF-8''notes.txt")
        );
        assert_eq!(response.into_string().await.unwrap(), "hello there");
    }

    #[rocket::async_test]
    async fn test_access_gate_errors() {
        let (client, _temp_dir) = create_test_client().await;
        let uploaded = upload(&client, "").await;
        let id = field(&uploaded, "id");
        let token = field(&uploaded, "token");

        let wrong = get(&client, format!("/meta?id={}&token={}", id, "0".repeat(64))).await;
        assert_eq!(wrong.status(), Status::Forbidden);

        let unknown = get(&client, format!("/meta?id={}&token={}", "f".repeat(24), token)).await;
        assert_eq!(unknown.status(), Status::NotFound);

        let missing = get(&client, format!("/meta?id={}", id)).await;
        assert_eq!(missing.status(), Status::BadRequest);

        let bad_file = get(&client, format!("/file?id={}&token={}&file=nope", id, token)).await;
        assert_eq!(bad_file.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_oversized_upload_is_rejected() {
        let (client, _temp_dir) = create_test_client().await;
        let big = vec![b'x'; 2048];
        let body = multipart(&[], &[("big.bin", "application/octet-stream", big.as_slice())]);

        let response = client
            .post("/uploadFile")
            .header(ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY)))
            .body(body)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::PayloadTooLarge);
    }

    #[rocket::async_test]
    async fn test_pin_gate() {
        let (client, _temp_dir) = create_test_client().await;
        let uploaded = upload(&client, "1234").await;
        let id = field(&uploaded, "id");
        let token = field(&uploaded, "token");
        assert_eq!(uploaded["requiresPin"], true);

        let locked = get(&client, format!("/meta?id={}&token={}", id, token)).await;
        assert_eq!(locked.status(), Status::Forbidden);
        assert_eq!(locked.into_string().await.unwrap(), "pin required");

        let wrong = client
            .post("/unlock")
            .header(ContentType::Form)
            .body(format!("id={}&token={}&pin=9999", id, token))
            .dispatch()
            .await;
        assert_eq!(wrong.status(), Status::Forbidden);
        assert_eq!(wrong.into_string().await.unwrap(), "invalid pin");

        let incomplete = client
            .post("/unlock")
            .header(ContentType::Form)
            .body("pin=1234")
            .dispatch()
            .await;
        assert_eq!(incomplete.status(), Status::BadRequest);
        assert_eq!(incomplete.into_string().await.unwrap(), "missing id or token");

        let unlocked = client
            .post("/unlock")
            .header(ContentType::Form)
            .body(format!("id={}&token={}&pin=1234", id, token))
            .dispatch()
            .await;
        assert_eq!(unlocked.status(), Status::NoContent);

        let meta = get(&client, format!("/meta?id={}&token={}", id, token)).await;
        assert_eq!(meta.status(), Status::Ok);
        let meta = meta.into_json::<Value>().await.unwrap();
        assert_eq!(meta["requiresPin"], true);
    }

    #[rocket::async_test]
    async fn test_device_flow() {
        let (client, _temp_dir) = create_test_client().await;
        let uploaded = upload(&client, "").await;
        let transfer_id = field(&uploaded, "id");
        let token = field(&uploaded, "token");

        let registered = client
            .post("/api/devices/register")
            .header(ContentType::JSON)
            .body(json!({ "name": "  Kitchen tablet " }).to_string())
            .dispatch()
            .await;
        assert_eq!(registered.status(), Status::Ok);
        let device = registered.into_json::<Value>().await.unwrap();
        assert_eq!(device["name"], "Kitchen tablet");
        let device_id = field(&device, "id").to_string();

        let listed = get(&client, "/api/devices".to_string()).await;
        let listed = listed.into_json::<Value>().await.unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let empty = get(&client, format!("/api/devices/pending?id={}", device_id)).await;
        assert_eq!(empty.status(), Status::NoContent);

        let rejected = client
            .post("/api/devices/notify")
            .header(ContentType::JSON)
            .body(json!({ "deviceId": device_id, "transferId": transfer_id, "token": "bad" }).to_string())
            .dispatch()
            .await;
        assert_eq!(rejected.status(), Status::Forbidden);

        let notified = client
            .post("/api/devices/notify")
            .header(ContentType::JSON)
            .body(json!({ "deviceId": device_id, "transferId": transfer_id, "token": token }).to_string())
            .dispatch()
            .await;
        assert_eq!(notified.status(), Status::NoContent);

        let pending = get(&client, format!("/api/devices/pending?id={}", device_id)).await;
        assert_eq!(pending.status(), Status::Ok);
        let pending = pending.into_json::<Value>().await.unwrap();
        assert_eq!(pending["transferId"], transfer_id);
        assert_eq!(pending["files"][0]["name"], "beach.jpg");

        let stale = client
            .post("/api/devices/clear")
            .header(ContentType::JSON)
            .body(json!({ "deviceId": device_id, "transferId": "other" }).to_string())
            .dispatch()
            .await;
        assert_eq!(stale.status(), Status::NoContent);
        let still = get(&client, format!("/api/devices/pending?id={}", device_id)).await;
        assert_eq!(still.status(), Status::Ok);

        let cleared = client
            .post("/api/devices/clear")
            .header(ContentType::JSON)
            .body(json!({ "deviceId": device_id, "transferId": transfer_id }).to_string())
            .dispatch()
            .await;
        assert_eq!(cleared.status(), Status::NoContent);
        let gone = get(&client, format!("/api/devices/pending?id={}", device_id)).await;
        assert_eq!(gone.status(), Status::NoContent);
    }

    #[rocket::async_test]
    async fn test_device_errors() {
        let (client, _temp_dir) = create_test_client().await;

        let invalid = client
            .post("/api/devices/register")
            .header(ContentType::JSON)
            .body("not json")
            .dispatch()
            .await;
        assert_eq!(invalid.status(), Status::BadRequest);

        let unnamed = client
            .post("/api/devices/register")
            .header(ContentType::JSON)
            .body(json!({ "name": "   " }).to_string())
            .dispatch()
            .await;
        assert_eq!(unnamed.status(), Status::BadRequest);

        let missing = get(&client, "/api/devices/pending".to_string()).await;
        assert_eq!(missing.status(), Status::BadRequest);

        let unknown = get(&client, "/api/devices/pending?id=ghost".to_string()).await;
        assert_eq!(unknown.status(), Status::BadRequest);

        let no_device = client
            .post("/api/devices/clear")
            .header(ContentType::JSON)
            .body(json!({ "transferId": "t1" }).to_string())
            .dispatch()
            .await;
        assert_eq!(no_device.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn test_revoke() {
        let (client, temp_dir) = create_test_client().await;
        let uploaded = upload(&client, "").await;
        let id = field(&uploaded, "id");
        let token = field(&uploaded, "token");

        let revoked = client
            .post("/api/transfers/revoke")
            .header(ContentType::JSON)
            .body(json!({ "transferId": id, "token": token }).to_string())
            .dispatch()
            .await;
        assert_eq!(revoked.status(), Status::NoContent);

        let meta = get(&client, format!("/meta?id={}&token={}", id, token)).await;
        assert_eq!(meta.status(), Status::NotFound);
        assert!(!temp_dir.path().join("uploads").join(id).exists());
    }
}

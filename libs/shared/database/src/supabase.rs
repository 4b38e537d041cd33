use anyhow::Result;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::profile::Profile;

use crate::error::SupabaseError;
use crate::rest::in_list;

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
    // Bearer used when the caller supplies none (service-role clients only).
    default_token: Option<String>,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            api_key: config.supabase_anon_key.clone(),
            default_token: None,
        }
    }

    /// Client authenticated with the service-role key. Bypasses row-level
    /// security, so only background jobs may use it.
    pub fn service_role(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            api_key: config.supabase_service_role_key.clone(),
            default_token: Some(config.supabase_service_role_key.clone()),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| SupabaseError::InvalidHeader(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token.or(self.default_token.as_deref()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| SupabaseError::InvalidHeader(e.to_string()))?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         auth_token: Option<&str>, body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;
        Self::read_response(response).await
    }

    /// Calls a database function through `/rest/v1/rpc/{function}`.
    pub async fn rpc<T>(&self, function: &str, args: Value, auth_token: &str) -> Result<T>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request(Method::POST, &path, Some(auth_token), Some(args)).await
    }

    /// Uploads raw bytes into a storage bucket and returns the object key.
    pub async fn upload_object(
        &self,
        bucket: &str,
        object_path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        auth_token: &str,
    ) -> Result<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, object_path);
        debug!("Uploading {} bytes to {}", bytes.len(), url);

        let mut headers = self.get_headers(Some(auth_token))?;
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(content_type)
                .map_err(|e| SupabaseError::InvalidHeader(e.to_string()))?,
        );
        headers.insert("x-upsert", HeaderValue::from_static("false"));

        let response = self.client.post(&url)
            .headers(headers)
            .body(bytes)
            .send()
            .await?;

        let result: Value = Self::read_response(response).await?;
        let key = result
            .get("Key")
            .and_then(|k| k.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/{}", bucket, object_path));

        Ok(key)
    }

    async fn read_response<T>(response: reqwest::Response) -> Result<T>
    where T: DeserializeOwned {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("API error ({}): {}", status, text);
            return Err(SupabaseError::from_response(status.as_u16(), &text).into());
        }

        // Void functions and minimal-return writes answer with an empty body.
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(body)?)
    }

    pub async fn get_profile(&self, user_id: &str, auth_token: &str) -> Result<Option<Profile>> {
        let path = format!("/rest/v1/profiles?id=eq.{}", user_id);

        let mut rows: Vec<Profile> = self.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    /// Batch profile lookup used to merge names into appointment listings.
    pub async fn get_profiles(&self, ids: &[String], auth_token: &str) -> Result<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let path = format!(
            "/rest/v1/profiles?id={}&select=id,role,full_name,email,specialization",
            in_list(ids)
        );

        self.request(Method::GET, &path, Some(auth_token), None).await
    }
}

//! Profile client methods

use super::request::ApiRequest;
use super::{ApiClient, ClientError};
use shopfront_core::types::{ChangePasswordRequest, Profile};

impl ApiClient {
    pub async fn get_profile(&self) -> Result<Profile, ClientError> {
        self.send(ApiRequest::get("/profile")).await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ClientError> {
        let req = ApiRequest::post("/profile/change-password").json(request)?;
        self.send_empty(req).await.map(|_| ())
    }
}

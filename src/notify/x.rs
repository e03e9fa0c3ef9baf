use super::{MessageId, NotificationSink};
use crate::config::{
    NotifyConfig, ACCESS_TOKEN_ENV, ACCESS_TOKEN_SECRET_ENV, BEARER_TOKEN_ENV, CONSUMER_KEY_ENV,
    CONSUMER_SECRET_ENV,
};
use crate::error::{Result, SparkwatchError};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// OAuth 1.0a user-context keys
pub struct OAuth1Keys {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

/// How requests to the X API are authorized
pub enum XAuth {
    /// Signed with HMAC-SHA1 using consumer and access keys
    OAuth1(OAuth1Keys),
    /// OAuth 2.0 user-context bearer token
    Bearer(String),
}

impl XAuth {
    /// Pick credentials from `config`.
    ///
    /// Any OAuth 1.0a key makes all four mandatory. The bearer token is only
    /// used when no OAuth 1.0a key is set.
    pub fn from_config(config: &NotifyConfig) -> Result<Self> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let keys = [
            (present(&config.consumer_key), CONSUMER_KEY_ENV),
            (present(&config.consumer_secret), CONSUMER_SECRET_ENV),
            (present(&config.access_token), ACCESS_TOKEN_ENV),
            (present(&config.access_token_secret), ACCESS_TOKEN_SECRET_ENV),
        ];

        if keys.iter().any(|(value, _)| value.is_some()) {
            let missing: Vec<&str> = keys
                .iter()
                .filter(|(value, _)| value.is_none())
                .map(|(_, name)| *name)
                .collect();
            if !missing.is_empty() {
                return Err(SparkwatchError::system(format!(
                    "Incomplete OAuth 1.0a credentials for the x sink, missing {}",
                    missing.join(", ")
                )));
            }

            let [consumer_key, consumer_secret, access_token, access_token_secret] =
                keys.map(|(value, _)| value.unwrap_or_default());
            return Ok(Self::OAuth1(OAuth1Keys {
                consumer_key,
                consumer_secret,
                access_token,
                access_token_secret,
            }));
        }

        present(&config.bearer_token).map(Self::Bearer).ok_or_else(|| {
            SparkwatchError::system(format!(
                "The x sink needs {}, {}, {} and {}, or {}",
                CONSUMER_KEY_ENV,
                CONSUMER_SECRET_ENV,
                ACCESS_TOKEN_ENV,
                ACCESS_TOKEN_SECRET_ENV,
                BEARER_TOKEN_ENV
            ))
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::OAuth1(_) => "oauth1",
            Self::Bearer(_) => "bearer",
        }
    }

    /// `Authorization` header value for a request without query parameters
    fn header(&self, method: &Method, url: &str) -> String {
        match self {
            Self::Bearer(token) => format!("Bearer {}", token),
            Self::OAuth1(keys) => {
                let token = oauth1_request::Token::from_parts(
                    keys.consumer_key.as_str(),
                    keys.consumer_secret.as_str(),
                    keys.access_token.as_str(),
                    keys.access_token_secret.as_str(),
                );
                // JSON bodies are not part of the OAuth 1.0a signature base
                if *method == Method::POST {
                    oauth1_request::post(url, &(), &token, oauth1_request::HMAC_SHA1)
                } else {
                    oauth1_request::get(url, &(), &token, oauth1_request::HMAC_SHA1)
                }
            }
        }
    }
}

/// Posts to the X API v2
pub struct XSink {
    http: reqwest::Client,
    endpoint: String,
    auth: XAuth,
}

#[derive(Serialize)]
struct CreatePost<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplyTarget<'a>>,
}

#[derive(Serialize)]
struct ReplyTarget<'a> {
    in_reply_to_tweet_id: &'a str,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: String,
}

#[derive(Deserialize)]
struct Account {
    username: String,
}

impl XSink {
    pub fn new(config: &NotifyConfig) -> Result<Self> {
        let auth = XAuth::from_config(config)?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        debug!("X sink using {} credentials", auth.kind());

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method.clone(), url)
            .header(AUTHORIZATION, self.auth.header(&method, url))
    }

    /// Look up the account the credentials belong to
    pub async fn account(&self) -> Result<String> {
        let url = format!("{}/2/users/me", self.endpoint);
        let response = self.request(Method::GET, &url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SparkwatchError::post(format!(
                "Credential check returned {}",
                status
            )));
        }

        let account: Envelope<Account> = serde_json::from_slice(&response.bytes().await?)?;
        Ok(account.data.username)
    }
}

#[async_trait]
impl NotificationSink for XSink {
    async fn verify(&self) -> Result<()> {
        let username = self.account().await?;
        info!("Posting as @{}", username);
        Ok(())
    }

    async fn post(&self, text: &str, in_reply_to: Option<&MessageId>) -> Result<MessageId> {
        let url = format!("{}/2/tweets", self.endpoint);
        let body = CreatePost {
            text,
            reply: in_reply_to.map(|id| ReplyTarget {
                in_reply_to_tweet_id: id.as_str(),
            }),
        };

        let response = self
            .request(Method::POST, &url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SparkwatchError::post(e.to_string()))?;

        let status = response.status();
        let payload = response
            .bytes()
            .await
            .map_err(|e| SparkwatchError::post(e.to_string()))?;

        if !status.is_success() {
            return Err(SparkwatchError::post(format!(
                "{} {}",
                status,
                String::from_utf8_lossy(&payload)
            )));
        }

        let created: Envelope<CreatedPost> = serde_json::from_slice(&payload)
            .map_err(|e| SparkwatchError::post(format!("Unexpected response: {}", e)))?;

        debug!("Created post {}", created.data.id);
        Ok(MessageId(created.data.id))
    }
}

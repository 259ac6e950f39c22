//! [`WikiBackend`] implementation over the MediaWiki client.

use async_trait::async_trait;
use grab_core::{Result, WikiBackend};
use grab_models::ArticleInfo;

use crate::client::MediaWikiClient;

#[async_trait]
impl WikiBackend for MediaWikiClient {
    async fn article(&self, title: &str) -> Result<ArticleInfo> {
        Ok(self.page_info(title).await?)
    }

    async fn section_exists(&self, title: &str, section: &str) -> Result<bool> {
        Ok(self.find_section(title, section).await?.is_some())
    }

    async fn write_page(&self, title: &str, body: &str) -> Result<String> {
        Ok(MediaWikiClient::write_page(self, title, body).await?)
    }

    async fn write_section(&self, title: &str, section: &str, body: &str) -> Result<String> {
        Ok(MediaWikiClient::write_section(self, title, section, body).await?)
    }

    async fn append(&self, title: &str, section: Option<&str>, body: &str) -> Result<String> {
        Ok(self.append_text(title, section, body).await?)
    }
}

//! Seam between the scan flow and the GOG client.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use gogshelf_gog::GogError;
use gogshelf_store::GameJson;

/// Resolves a game to GOG metadata and persists it for `key`.
///
/// The scan flow and the refresh endpoint only know this trait, so tests
/// can swap in a resolver that never touches the network.
pub trait MetadataResolver: Send + Sync {
    /// Resolves by pinned `product_id` when given, otherwise by searching
    /// for `search_name`. `Ok(None)` means the search found nothing.
    fn resolve<'a>(
        &'a self,
        search_name: &'a str,
        metadata_root: &'a Path,
        key: &'a str,
        product_id: Option<i64>,
        download_assets: bool,
    ) -> Pin<Box<dyn Future<Output = Result<Option<GameJson>, GogError>> + Send + 'a>>;
}

impl MetadataResolver for gogshelf_gog::Client {
    fn resolve<'a>(
        &'a self,
        search_name: &'a str,
        metadata_root: &'a Path,
        key: &'a str,
        product_id: Option<i64>,
        download_assets: bool,
    ) -> Pin<Box<dyn Future<Output = Result<Option<GameJson>, GogError>> + Send + 'a>> {
        Box::pin(async move {
            gogshelf_gog::resolve_and_save(
                self,
                search_name,
                metadata_root,
                key,
                product_id,
                download_assets,
            )
            .await
        })
    }
}

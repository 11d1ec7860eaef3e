pub mod episodes;
pub mod genres;
pub mod metadata;
pub mod page_memo;
pub mod providers;
pub mod response_cache;

pub use episodes::EpisodeRepository;
pub use genres::GenreRepository;
pub use metadata::MetadataRepository;
pub use page_memo::{MemoRow, PageMemoRepository, QueryShape};
pub use providers::ProviderRepository;
pub use response_cache::{CacheEntry, ResponseCacheRepository};

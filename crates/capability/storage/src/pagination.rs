//! 通用分页引擎
//!
//! 面向抽象可查询集合的 offset 分页器，与记录类型和过滤条件解耦。
//! 集合侧只需实现 [`PagedCollection`]（计数 + 取页）；分页器负责
//! skip 计算、总页数推导和上下页 URL 重建。
//!
//! 一致性说明：取页与计数是同一集合上的两次独立读取，之间没有
//! 事务快照。并发写入下 `total_items` 相对 `items` 可能偏旧；无并发
//! 写入时跨页遍历保证稳定有序、不重不漏。

use crate::error::StorageError;
use async_trait::async_trait;
use serde::Serialize;

/// 抽象可分页集合：按过滤条件计数与取页。
///
/// `fetch_page` 按集合声明的排序返回（默认创建时间倒序），
/// 排序在无并发写入时跨页稳定。
#[async_trait]
pub trait PagedCollection<F, T>: Send + Sync {
    /// 统计匹配过滤条件的总条数。
    async fn count_items(&self, filter: &F) -> Result<u64, StorageError>;

    /// 跳过 `skip` 条后取最多 `limit` 条匹配记录。
    async fn fetch_page(
        &self,
        filter: &F,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<T>, StorageError>;
}

/// 一页查询结果。按请求即时计算，不持久化。
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub next_page_url: Option<String>,
    pub previous_page_url: Option<String>,
}

impl<T> Page<T> {
    /// 逐条转换记录类型，分页元数据不变。
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            next_page_url: self.next_page_url,
            previous_page_url: self.previous_page_url,
        }
    }
}

/// 分页器。
///
/// `base_path` 是当前请求的路径（不含查询串）；上下页 URL 由
/// `base_path` + 过滤条件快照 + 新的 page/limit 重建，原始查询串
/// 一律丢弃。
///
/// 输入约定：`page >= 1`、`limit ∈ [1, 100]` 由调用方验证
/// （见 [`crate::validation::ensure_page_bounds`]）；分页器只在
/// 集合访问出错时失败，错误原样向上传播。
pub struct Paginator<'a, C: ?Sized> {
    collection: &'a C,
    base_path: String,
    filter_params: Vec<(String, String)>,
}

impl<'a, C: ?Sized> Paginator<'a, C> {
    pub fn new(collection: &'a C, base_path: impl Into<String>) -> Self {
        Self {
            collection,
            base_path: base_path.into(),
            filter_params: Vec::new(),
        }
    }

    /// 设置 URL 重建用的过滤条件快照。
    pub fn with_filter_params(mut self, params: Vec<(String, String)>) -> Self {
        self.filter_params = params;
        self
    }

    /// 取一页结果。
    pub async fn paginate<F, T>(
        &self,
        filter: &F,
        page: u64,
        limit: u64,
    ) -> Result<Page<T>, StorageError>
    where
        C: PagedCollection<F, T>,
        F: Sync,
        T: Send,
    {
        let skip = (page - 1).saturating_mul(limit);
        let items = self.collection.fetch_page(filter, skip, limit).await?;
        let total_items = self.collection.count_items(filter).await?;
        let total_pages = total_items.div_ceil(limit.max(1));

        let next_page_url = if page < total_pages {
            Some(self.page_url(page + 1, limit))
        } else {
            None
        };
        let previous_page_url = if page > 1 {
            Some(self.page_url(page - 1, limit))
        } else {
            None
        };

        Ok(Page {
            items,
            total_items,
            page,
            limit,
            total_pages,
            next_page_url,
            previous_page_url,
        })
    }

    fn page_url(&self, page: u64, limit: u64) -> String {
        let mut params: Vec<String> = self
            .filter_params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        params.push(format!("page={}", page));
        params.push(format!("limit={}", limit));
        format!("{}?{}", self.base_path, params.join("&"))
    }
}

use crate::config::ArtStyle;
use crate::error::{MediaError, Result};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// 图片种子中保留的文本字符数
pub const SEED_PREFIX_CHARS: usize = 20;

/// 占位图加载失败时使用的示例图片
pub const FALLBACK_POOL: [&str; 6] = [
    "https://s.coze.cn/image/15A_Eo27QlE/",
    "https://s.coze.cn/image/wOCuJaVgyvU/",
    "https://s.coze.cn/image/5B1-VBaFyY8/",
    "https://s.coze.cn/image/3HrMMAmaiYI/",
    "https://s.coze.cn/image/bmIRdN-y-e0/",
    "https://s.coze.cn/image/U0L60H4TqPU/",
];

/// 生成分镜图片种子：文本前缀、风格、序号
pub fn image_seed(text: &str, style: ArtStyle, scene_index: usize) -> String {
    let prefix: String = text.trim().chars().take(SEED_PREFIX_CHARS).collect();
    format!("{}-{}-{}", prefix, style.id(), scene_index)
}

/// 为分镜生成确定的占位图片地址
#[derive(Debug, Clone)]
pub struct PlaceholderResolver {
    base: Url,
    width: u32,
    height: u32,
}

impl PlaceholderResolver {
    pub fn new(base: &str, width: u32, height: u32) -> std::result::Result<Self, MediaError> {
        let base = Url::parse(base).map_err(|_| MediaError::InvalidBase(base.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(MediaError::CannotBeABase(base.to_string()));
        }
        Ok(Self {
            base,
            width,
            height,
        })
    }

    /// `{base}/seed/{seed}/{width}/{height}`，种子编码为单个路径段
    pub fn resolve(
        &self,
        text: &str,
        style: ArtStyle,
        scene_index: usize,
    ) -> std::result::Result<String, MediaError> {
        let seed = image_seed(text, style, scene_index);
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| MediaError::CannotBeABase(self.base.to_string()))?
            .pop_if_empty()
            .push("seed")
            .push(&seed)
            .push(&self.width.to_string())
            .push(&self.height.to_string());
        Ok(url.into())
    }

    pub fn fallback(&self, scene_index: usize) -> &'static str {
        FALLBACK_POOL[scene_index % FALLBACK_POOL.len()]
    }

    /// 生成图片地址，无法加载时换成备用图片
    pub async fn resolve_verified<P: ImageProbe>(
        &self,
        probe: &P,
        text: &str,
        style: ArtStyle,
        scene_index: usize,
    ) -> Result<String> {
        let url = self.resolve(text, style, scene_index)?;
        if probe.is_available(&url).await {
            debug!("Placeholder for scene {} is reachable", scene_index);
            Ok(url)
        } else {
            let fallback = self.fallback(scene_index);
            warn!("Placeholder {} failed to load, using fallback {}", url, fallback);
            Ok(fallback.to_string())
        }
    }
}

/// 检查图片地址能否加载
pub trait ImageProbe {
    fn is_available(&self, url: &str) -> impl Future<Output = bool> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpImageProbe {
    client: Client,
}

impl HttpImageProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ImageProbe for HttpImageProbe {
    fn is_available(&self, url: &str) -> impl Future<Output = bool> + Send {
        let request = self.client.head(url);
        let url = url.to_string();
        async move {
            match request.send().await {
                Ok(response) => response.status().is_success(),
                Err(e) => {
                    warn!("Failed to probe image {}: {}", url, e);
                    false
                }
            }
        }
    }
}

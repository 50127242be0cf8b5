use std::{collections::HashMap, path::PathBuf, sync::Arc, time::SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

const HEADER_TEMPLATE: &str = "_header.html.liquid";
const FOOTER_TEMPLATE: &str = "_footer.html.liquid";

pub struct TemplateEngine {
    template_dir: PathBuf,
    cache: Arc<RwLock<HashMap<String, CachedTemplate>>>,
}

struct CachedTemplate {
    content: String,
    modified: SystemTime,
}

impl TemplateEngine {
    pub fn new(template_dir: PathBuf) -> Self {
        Self {
            template_dir,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn load_template(&self, path: &str) -> Result<String, String> {
        let template_path = self.template_dir.join(path);

        let metadata = tokio::fs::metadata(&template_path)
            .await
            .map_err(|e| format!("Failed to get metadata for {}: {}", path, e))?;

        let modified = metadata
            .modified()
            .map_err(|e| format!("Failed to get modified time: {}", e))?;

        let mut cache = self.cache.write().await;

        if let Some(cached) = cache.get(path)
            && cached.modified >= modified
        {
            debug!("Using cached template for {}", path);
            return Ok(cached.content.clone());
        }

        info!("Loading template: {}", path);

        let content = tokio::fs::read_to_string(&template_path)
            .await
            .map_err(|e| format!("Failed to read template {}: {}", path, e))?;

        cache.insert(
            path.to_string(),
            CachedTemplate {
                content: content.clone(),
                modified,
            },
        );

        Ok(content)
    }

    fn parse(content: &str) -> Result<liquid::Template, String> {
        liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| format!("Failed to create parser: {}", e))?
            .parse(content)
            .map_err(|e| format!("Failed to parse template: {}", e))
    }

    /// Renders a partial with the page's globals. A missing or broken partial
    /// renders as nothing.
    async fn render_partial(&self, name: &str, globals: &liquid::Object) -> String {
        let content = match self.load_template(name).await {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to load {}: {}", name, e);
                return String::new();
            }
        };

        Self::parse(&content)
            .and_then(|template| {
                template
                    .render(globals)
                    .map_err(|e| format!("Failed to render {}: {}", name, e))
            })
            .unwrap_or_else(|e| {
                error!("{}", e);
                String::new()
            })
    }

    /// Renders `template_name` with `globals`, plus `header` and `footer`
    /// holding the rendered shared partials.
    pub async fn render_template(
        &self,
        template_name: &str,
        globals: liquid::Object,
    ) -> Result<String, String> {
        let template_content = self.load_template(template_name).await?;
        let template = Self::parse(&template_content)?;

        let header = self.render_partial(HEADER_TEMPLATE, &globals).await;
        let footer = self.render_partial(FOOTER_TEMPLATE, &globals).await;

        let mut full_globals = globals;
        full_globals.insert("header".into(), liquid::model::Value::Scalar(header.into()));
        full_globals.insert("footer".into(), liquid::model::Value::Scalar(footer.into()));

        template
            .render(&full_globals)
            .map_err(|e| format!("Failed to render template: {}", e))
    }
}

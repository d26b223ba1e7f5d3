//! 邮件模板

use shiroha_errors::{AppError, AppResult};
use std::collections::HashMap;
use tera::Tera;
use tracing::debug;

/// 邮件模板管理器
pub struct EmailTemplate {
    tera: Tera,
}

impl EmailTemplate {
    /// 加载目录下所有 `.html` 与 `.txt` 模板
    pub fn new(template_dir: &str) -> AppResult<Self> {
        let pattern = format!("{}/**/*.{{html,txt}}", template_dir);
        let tera = Tera::new(&pattern)
            .map_err(|e| AppError::internal(format!("Failed to load email templates: {}", e)))?;

        debug!(
            template_dir = %template_dir,
            count = tera.get_template_names().count(),
            "Email templates loaded"
        );

        Ok(Self { tera })
    }

    /// 从内存中的模板字符串创建
    pub fn from_strings(templates: HashMap<String, String>) -> AppResult<Self> {
        let mut tera = Tera::default();

        for (name, content) in templates {
            tera.add_raw_template(&name, &content).map_err(|e| {
                AppError::internal(format!("Failed to add template {}: {}", name, e))
            })?;
        }

        Ok(Self { tera })
    }

    /// 渲染模板
    pub fn render(&self, template_name: &str, context: &serde_json::Value) -> AppResult<String> {
        let context = tera::Context::from_serialize(context)
            .map_err(|e| AppError::internal(format!("Failed to create template context: {}", e)))?;

        self.tera.render(template_name, &context).map_err(|e| {
            AppError::internal(format!(
                "Failed to render template {}: {}",
                template_name, e
            ))
        })
    }

    /// 渲染 HTML 正文及同名 `.txt` 纯文本正文
    ///
    /// tera 只对 `.html` 模板做转义，纯文本里的链接保持原样
    pub fn render_with_text(
        &self,
        html_template: &str,
        context: &serde_json::Value,
    ) -> AppResult<(String, String)> {
        let stem = html_template
            .strip_suffix(".html")
            .ok_or_else(|| AppError::internal(format!("Not an html template: {}", html_template)))?;

        let html = self.render(html_template, context)?;
        let text = self.render(&format!("{}.txt", stem), context)?;

        Ok((html, text))
    }
}

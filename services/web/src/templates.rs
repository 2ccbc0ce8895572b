//! HTML page templates

use minijinja::Environment;
use serde::Serialize;
use std::sync::Arc;

/// Compiled page templates, embedded in the binary
#[derive(Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    /// Load all page templates
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("../templates/base.html"))?;
        env.add_template("login.html", include_str!("../templates/login.html"))?;
        env.add_template("dashboard.html", include_str!("../templates/dashboard.html"))?;
        env.add_template("loading.html", include_str!("../templates/loading.html"))?;

        Ok(Self { env: Arc::new(env) })
    }

    /// Render a template with the given context
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }
}

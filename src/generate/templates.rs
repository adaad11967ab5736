//! Static templates for the generated repository file set
//!
//! Everything except the application source and the dependency manifest is a
//! fixed template. The CI workflow is parameterized only by the platform app
//! name.

use crate::generate::composer::GeneratedApp;
use crate::generate::kind::AppKind;

/// Path of the application source file
pub const APP_PATH: &str = "app.py";

/// Path of the CI workflow inside the repository
pub const WORKFLOW_PATH: &str = ".github/workflows/deploy.yml";

/// Workflow file name used for dispatch calls
pub const WORKFLOW_FILE: &str = "deploy.yml";

/// Branch the contents API commits to on a fresh repository
pub const DEFAULT_BRANCH: &str = "main";

const DOCKERFILE: &str = r#"FROM python:3.11-slim

WORKDIR /app

COPY requirements.txt .

RUN pip install --no-cache-dir -r requirements.txt

COPY . .

EXPOSE 8000

RUN chmod +x entrypoint.sh

ENTRYPOINT ["./entrypoint.sh"]
"#;

const HEROKU_YML: &str = r#"build:
  docker:
    web: Dockerfile

run:
  web: ./entrypoint.sh
"#;

/// A file to be committed to the published repository
#[derive(Debug, Clone)]
pub struct RepoFile {
    pub path: String,
    pub content: String,
    pub message: String,
}

impl RepoFile {
    fn new(path: &str, content: String, message: &str) -> Self {
        Self {
            path: path.to_string(),
            content,
            message: message.to_string(),
        }
    }
}

fn procfile(kind: AppKind) -> String {
    format!("web: {}\n", kind.run_command())
}

fn setup_sh(kind: AppKind) -> String {
    match kind {
        AppKind::Streamlit => r#"#!/bin/bash
mkdir -p ~/.streamlit/
cat > ~/.streamlit/config.toml <<CONF
[server]
headless = true
port = $PORT
enableCORS = false
CONF
"#
        .to_string(),
        AppKind::Gradio | AppKind::Dash => "#!/bin/bash\n# No server-side setup required\n".to_string(),
    }
}

fn entrypoint_sh(kind: AppKind) -> String {
    format!(
        "#!/bin/bash\nexport PORT=${{PORT:-8000}}\nexec {}\n",
        kind.run_command()
    )
}

/// The fixed file set committed at publish time, in commit order
pub fn generated_files(app: &GeneratedApp) -> Vec<RepoFile> {
    vec![
        RepoFile::new(APP_PATH, app.source.clone(), "initial commit"),
        RepoFile::new("requirements.txt", app.manifest.clone(), "add requirements"),
        RepoFile::new("Procfile", procfile(app.kind), "add Procfile"),
        RepoFile::new("setup.sh", setup_sh(app.kind), "add setup.sh"),
        RepoFile::new("Dockerfile", DOCKERFILE.to_string(), "add Dockerfile"),
        RepoFile::new(
            "entrypoint.sh",
            entrypoint_sh(app.kind),
            "add entrypoint.sh",
        ),
        RepoFile::new("heroku.yml", HEROKU_YML.to_string(), "add heroku.yml"),
    ]
}

/// CI workflow that builds the container image, pushes it to the platform
/// registry, and releases it, authenticated by the provisioned secret
pub fn ci_workflow(app_name: &str) -> String {
    format!(
        r#"name: Deploy

on:
  push:
    branches:
      - main
  workflow_dispatch:

jobs:
  build-and-deploy:
    runs-on: ubuntu-latest

    steps:
      - name: Checkout code
        uses: actions/checkout@v3

      - name: Set up Docker Buildx
        uses: docker/setup-buildx-action@v2

      - name: Login to Heroku Container Registry
        run: echo "${{{{ secrets.HEROKU_API_KEY }}}}" | docker login --username=_ --password-stdin registry.heroku.com

      - name: Build Docker image
        run: docker build -t registry.heroku.com/{app_name}/web .

      - name: Push Docker image
        run: docker push registry.heroku.com/{app_name}/web

      - name: Release app
        run: heroku container:release web --app {app_name}
        env:
          HEROKU_API_KEY: ${{{{ secrets.HEROKU_API_KEY }}}}
"#
    )
}

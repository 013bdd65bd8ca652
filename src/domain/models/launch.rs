use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::config::{CommandConfig, ServiceConfig};

/// Placeholder replaced by the artifact path in prebuilt launch arguments
pub const ARTIFACT_PLACEHOLDER: &str = "{artifact}";

/// The two ways a service can be started
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchPath {
    /// Run an existing build output
    Prebuilt { artifact: PathBuf },
    /// Build from source and serve
    BuildAndServe,
}

/// How to start the service: preferred prebuilt artifact, fallback command
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub working_dir: PathBuf,
    pub artifact_dir: PathBuf,
    pub artifact_extension: String,
    pub prebuilt: CommandConfig,
    pub build_and_serve: CommandConfig,
    pub env: HashMap<String, String>,
}

impl LaunchSpec {
    pub fn from_config(service: &ServiceConfig) -> Self {
        Self {
            working_dir: service.working_dir.clone(),
            artifact_dir: service.prebuilt.artifact_dir.clone(),
            artifact_extension: service.prebuilt.artifact_extension.clone(),
            prebuilt: service.prebuilt.command.clone(),
            build_and_serve: service.build_and_serve.clone(),
            env: service.env.clone(),
        }
    }

    /// Resolve a concrete plan
    ///
    /// `artifact` is the located build output relative to `working_dir`, or
    /// `None` when no build output exists.
    pub fn plan(&self, artifact: Option<PathBuf>) -> LaunchPlan {
        match artifact {
            Some(artifact) => {
                let value = artifact.to_string_lossy().into_owned();
                LaunchPlan {
                    program: self.prebuilt.program.clone(),
                    args: expand_args(&self.prebuilt.args, ARTIFACT_PLACEHOLDER, &value),
                    working_dir: self.working_dir.clone(),
                    env: self.env.clone(),
                    path: LaunchPath::Prebuilt { artifact },
                }
            }
            None => LaunchPlan {
                path: LaunchPath::BuildAndServe,
                program: self.build_and_serve.program.clone(),
                args: self.build_and_serve.args.clone(),
                working_dir: self.working_dir.clone(),
                env: self.env.clone(),
            },
        }
    }

    /// Directory searched for the prebuilt artifact
    pub fn artifact_search_dir(&self) -> PathBuf {
        self.working_dir.join(&self.artifact_dir)
    }
}

/// A resolved launch command for one attempt
#[derive(Debug, Clone, Serialize)]
pub struct LaunchPlan {
    pub path: LaunchPath,
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    #[serde(skip)]
    pub env: HashMap<String, String>,
}

impl LaunchPlan {
    /// Shell-like rendering for display
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

/// Replace `placeholder` inside `args` with `value`
///
/// When no argument contains the placeholder, `value` is appended as the last
/// argument.
pub fn expand_args(args: &[String], placeholder: &str, value: &str) -> Vec<String> {
    if args.iter().any(|a| a.contains(placeholder)) {
        args.iter().map(|a| a.replace(placeholder, value)).collect()
    } else {
        let mut expanded = args.to_vec();
        expanded.push(value.to_string());
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> LaunchSpec {
        LaunchSpec::from_config(&ServiceConfig::default())
    }

    #[test]
    fn test_prebuilt_plan_substitutes_artifact() {
        let plan = spec().plan(Some(PathBuf::from("target/api-1.0.jar")));
        assert_eq!(
            plan.path,
            LaunchPath::Prebuilt {
                artifact: PathBuf::from("target/api-1.0.jar")
            }
        );
        assert_eq!(plan.program, "java");
        assert_eq!(plan.args, vec!["-jar", "target/api-1.0.jar"]);
        assert_eq!(plan.command_line(), "java -jar target/api-1.0.jar");
    }

    #[test]
    fn test_missing_artifact_falls_back_to_build_and_serve() {
        let plan = spec().plan(None);
        assert_eq!(plan.path, LaunchPath::BuildAndServe);
        assert_eq!(plan.command_line(), "mvn spring-boot:run");
        assert_eq!(plan.working_dir(), Path::new("api"));
    }

    #[test]
    fn test_expand_args_appends_without_placeholder() {
        let args = vec!["-jar".to_string(), "cli.jar".to_string()];
        assert_eq!(
            expand_args(&args, "{base_url}", "http://localhost:8080"),
            vec!["-jar", "cli.jar", "http://localhost:8080"]
        );
    }

    #[test]
    fn test_expand_args_replaces_inside_argument() {
        let args = vec!["--api={base_url}/".to_string()];
        assert_eq!(
            expand_args(&args, "{base_url}", "http://h:1"),
            vec!["--api=http://h:1/"]
        );
    }

    #[test]
    fn test_artifact_search_dir() {
        assert_eq!(spec().artifact_search_dir(), PathBuf::from("api/target"));
    }
}

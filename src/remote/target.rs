//! Command lines for the configured execution target

use std::fmt;

use crate::config::{TargetConfig, TargetKind};

/// Program and arguments, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

/// The fixed place terminals and checks run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A container reached through `kubectl exec`
    Kubectl {
        kubectl: String,
        namespace: String,
        pod: String,
        container: String,
        shell: String,
    },
    /// A shell on this machine
    Local { shell: String },
}

impl Target {
    pub fn from_config(config: &TargetConfig) -> Self {
        match config.kind {
            TargetKind::Kubectl => Target::Kubectl {
                kubectl: config.kubectl.clone(),
                namespace: config.namespace.clone(),
                pod: config.pod.clone(),
                container: config.container.clone(),
                shell: config.shell.clone(),
            },
            TargetKind::Local => Target::Local {
                shell: config.shell.clone(),
            },
        }
    }

    /// One-shot, non-interactive invocation of `script`
    pub fn exec_command(&self, script: &str) -> CommandSpec {
        match self {
            Target::Kubectl {
                kubectl,
                namespace,
                pod,
                container,
                shell,
            } => CommandSpec::new(
                kubectl,
                &[
                    "exec",
                    "-n",
                    namespace.as_str(),
                    pod.as_str(),
                    "-c",
                    container.as_str(),
                    "--",
                    shell.as_str(),
                    "-c",
                    script,
                ],
            ),
            Target::Local { shell } => CommandSpec::new(shell, &["-c", script]),
        }
    }

    /// Interactive shell, to be attached to a PTY
    pub fn shell_command(&self) -> CommandSpec {
        match self {
            Target::Kubectl {
                kubectl,
                namespace,
                pod,
                container,
                shell,
            } => CommandSpec::new(
                kubectl,
                &[
                    "exec",
                    "-n",
                    namespace.as_str(),
                    pod.as_str(),
                    "-it",
                    "-c",
                    container.as_str(),
                    "--",
                    shell.as_str(),
                ],
            ),
            Target::Local { shell } => CommandSpec::new(shell, &[]),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Kubectl {
                namespace,
                pod,
                container,
                ..
            } => write!(f, "pod {}/{} container {}", namespace, pod, container),
            Target::Local { shell } => write!(f, "local shell {}", shell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn kubectl_target() -> Target {
        Target::from_config(&Config::default().target)
    }

    #[test]
    fn test_kubectl_exec_command() {
        let spec = kubectl_target().exec_command("test -f /tmp/done");
        assert_eq!(spec.program, "kubectl");
        assert_eq!(
            spec.args,
            vec![
                "exec",
                "-n",
                "default",
                "learning-ui-shell-0",
                "-c",
                "shell",
                "--",
                "/bin/bash",
                "-c",
                "test -f /tmp/done",
            ]
        );
    }

    #[test]
    fn test_kubectl_shell_command_is_interactive() {
        let spec = kubectl_target().shell_command();
        assert!(spec.args.contains(&"-it".to_string()));
        assert_eq!(spec.args.last().map(String::as_str), Some("/bin/bash"));
    }

    #[test]
    fn test_local_commands() {
        let target = Target::Local {
            shell: "/bin/sh".to_string(),
        };
        assert_eq!(
            target.exec_command("exit 0"),
            CommandSpec {
                program: "/bin/sh".to_string(),
                args: vec!["-c".to_string(), "exit 0".to_string()],
            }
        );
        assert!(target.shell_command().args.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            kubectl_target().to_string(),
            "pod default/learning-ui-shell-0 container shell"
        );
    }
}

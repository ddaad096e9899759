#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use hostscope::platform::{Os, Platform};
use hostscope::probe::{Host, Probe};

/// A host with no diagnostic tools installed except the ones scripted in.
#[derive(Default)]
pub struct ScriptedProbe {
    commands: HashMap<String, String>,
    urls: HashMap<String, String>,
}

impl ScriptedProbe {
    pub fn command(mut self, line: &str, output: &str) -> Self {
        self.commands.insert(line.to_string(), output.to_string());
        self
    }

    pub fn url(mut self, url: &str, body: &str) -> Self {
        self.urls.insert(url.to_string(), body.to_string());
        self
    }

    pub fn into_host(self, os: Os) -> Host {
        Host::new(
            Platform {
                os,
                arch: "aarch64",
                is_wsl: false,
            },
            Box::new(self),
            "http://ip.invalid",
            Duration::from_secs(1),
        )
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.commands.get(&line).cloned()
    }

    async fn read_file(&self, _path: &str) -> Option<String> {
        None
    }

    async fn read_link(&self, _path: &str) -> Option<String> {
        None
    }

    async fn fetch_text(&self, url: &str, _timeout: Duration) -> Option<String> {
        self.urls.get(url).cloned()
    }
}

pub fn bare_host(os: Os) -> Host {
    ScriptedProbe::default().into_host(os)
}

use anyhow::Context;
use glam::Vec3;
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize)]
struct ScriptedInputFile {
    steps: Vec<ScriptedStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedStep {
    position: Vec3,
    facing: Vec3,
    /// Keys pressed on the first frame of the step.
    #[serde(default)]
    keys: Vec<char>,
    /// Number of frames the step lasts.
    #[serde(default = "default_frames")]
    frames: u32,
    /// Per-frame position offset while the step lasts.
    #[serde(default)]
    walk: Vec3,
}

fn default_frames() -> u32 {
    1
}

impl ScriptedStep {
    pub fn new(position: Vec3, facing: Vec3) -> Self {
        Self {
            position,
            facing,
            keys: Vec::new(),
            frames: 1,
            walk: Vec3::ZERO,
        }
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = char>) -> Self {
        self.keys = keys.into_iter().collect();
        self
    }

    pub fn walking(mut self, walk: Vec3, frames: u32) -> Self {
        self.walk = walk;
        self.frames = frames;
        self
    }
}

/// One replayed player pose plus the keys pressed on that frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedFrame {
    pub position: Vec3,
    pub facing: Vec3,
    pub keys: Vec<char>,
}

pub struct ScriptedInputPlayer {
    steps: Vec<ScriptedStep>,
    index: usize,
    frame_in_step: u32,
}

impl ScriptedInputPlayer {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading scripted input {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("parsing scripted input {}", path.display()))
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let file: ScriptedInputFile = serde_json::from_str(contents)?;
        Self::from_steps(file.steps)
    }

    pub fn from_steps(steps: Vec<ScriptedStep>) -> anyhow::Result<Self> {
        if steps.is_empty() {
            anyhow::bail!("scripted input file contains no steps");
        }
        Ok(Self {
            steps,
            index: 0,
            frame_in_step: 0,
        })
    }

    /// Next frame, or `None` once every step has played.
    pub fn next_frame(&mut self) -> Option<ScriptedFrame> {
        loop {
            let step = self.steps.get(self.index)?;
            if self.frame_in_step >= step.frames {
                self.index += 1;
                self.frame_in_step = 0;
                continue;
            }

            let frame = ScriptedFrame {
                position: step.position + step.walk * self.frame_in_step as f32,
                facing: step.facing,
                keys: if self.frame_in_step == 0 {
                    step.keys.clone()
                } else {
                    Vec::new()
                },
            };
            self.frame_in_step += 1;
            return Some(frame);
        }
    }
}

impl Iterator for ScriptedInputPlayer {
    type Item = ScriptedFrame;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }
}

use anyhow::{anyhow, Result};
use logo_types::LogoStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Processing,
    Done,
    Error,
}

/// The in-flight (or just finished) generation of this session.
///
/// Each variant carries exactly the fields that make sense for it, and a
/// transition always builds a whole new value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CurrentGeneration {
    #[default]
    Idle,
    Processing {
        prompt: String,
        style: LogoStyle,
    },
    Done {
        prompt: String,
        style: LogoStyle,
        logo_url: String,
        project_id: String,
    },
    Error {
        prompt: Option<String>,
        style: Option<LogoStyle>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The user pressed create; shown before the server has answered.
    Submit { prompt: String, style: LogoStyle },
    Succeed { logo_url: String, project_id: String },
    Fail { message: String },
    /// "Try again", or entering the app.
    Reset,
}

impl CurrentGeneration {
    pub fn status(&self) -> Status {
        match self {
            CurrentGeneration::Idle => Status::Idle,
            CurrentGeneration::Processing { .. } => Status::Processing,
            CurrentGeneration::Done { .. } => Status::Done,
            CurrentGeneration::Error { .. } => Status::Error,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status() == Status::Processing
    }

    pub fn apply(&self, transition: Transition) -> Result<CurrentGeneration> {
        use CurrentGeneration::*;

        match (self, transition) {
            (Idle, Transition::Submit { prompt, style }) => Ok(Processing { prompt, style }),
            (Processing { .. }, Transition::Submit { .. }) => {
                Err(anyhow!("A logo is already being generated"))
            }
            (_, Transition::Submit { .. }) => {
                Err(anyhow!("Reset the previous generation before submitting again"))
            }

            (Processing { prompt, style }, Transition::Succeed { logo_url, project_id }) => {
                Ok(Done {
                    prompt: prompt.clone(),
                    style: *style,
                    logo_url,
                    project_id,
                })
            }
            (Processing { prompt, style }, Transition::Fail { message }) => Ok(Error {
                prompt: Some(prompt.clone()),
                style: Some(*style),
                message,
            }),
            (other, Transition::Succeed { .. }) | (other, Transition::Fail { .. }) => Err(
                anyhow!("No generation in progress to finish (status {:?})", other.status()),
            ),

            (Processing { .. }, Transition::Reset) => {
                Err(anyhow!("A generation in progress can't be cancelled"))
            }
            (_, Transition::Reset) => Ok(Idle),
        }
    }
}

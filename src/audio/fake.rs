use super::{AudioChannel, PlayRequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetSource(String),
    Play(PlayRequestId),
    Pause,
    SetRate(f32),
    Seek(f64),
    Stop,
}

/// Records every command; tests inject channel events by hand.
#[derive(Debug, Default)]
pub struct FakeChannel {
    pub commands: Vec<Command>,
    source: Option<String>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

impl AudioChannel for FakeChannel {
    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.commands.push(Command::SetSource(url.to_string()));
    }

    fn current_source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn play(&mut self, request: PlayRequestId) {
        self.commands.push(Command::Play(request));
    }

    fn pause(&mut self) {
        self.commands.push(Command::Pause);
    }

    fn set_rate(&mut self, multiplier: f32) {
        self.commands.push(Command::SetRate(multiplier));
    }

    fn seek(&mut self, seconds: f64) {
        self.commands.push(Command::Seek(seconds));
    }

    fn stop(&mut self) {
        self.commands.push(Command::Stop);
    }
}

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::Terminal;

use crate::audio::{AudioEngine, RendererHandle, StreamClock};
use crate::command::{Command, CommandBus, CommandSender};
use crate::sequencer::{
    shared, Meter, Playhead, SequencerState, SharedState, TapTempo, Transport, Voice,
};
use crate::ui::{render_grid, render_help, render_transport, GridState};

/// Application state
pub struct App {
    _audio: AudioEngine,
    state: SharedState,
    transport: Transport<StreamClock, RendererHandle>,
    tap: TapTempo,
    /// Epoch for tap timestamps (wall clock; taps are a UI gesture, not
    /// an audio event).
    epoch: Instant,
    command_bus: CommandBus,
    command_sender: CommandSender,
    grid_state: GridState,
    should_quit: bool,
}

impl App {
    pub fn new(bpm: f64, meter: Meter) -> Result<Self> {
        let audio = AudioEngine::new()?;
        let state = shared(SequencerState::new(bpm, meter));

        let playhead = Playhead::spawn(state.clone(), audio.clock());
        let transport = Transport::new(state.clone(), audio.clock(), audio.renderer(), playhead);

        let command_bus = CommandBus::new();
        let command_sender = command_bus.sender();

        Ok(Self {
            _audio: audio,
            state,
            transport,
            tap: TapTempo::new(),
            epoch: Instant::now(),
            command_bus,
            command_sender,
            grid_state: GridState::new(),
            should_quit: false,
        })
    }

    /// Run the main application loop
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = Self::setup_terminal()?;
        let result = self.main_loop(&mut terminal);
        Self::restore_terminal(&mut terminal)?;
        result
    }

    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;

            // Poll with a timeout so the playhead repaints promptly.
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            while let Some(cmd) = self.command_bus.try_recv() {
                self.apply_command(cmd);
            }

            if self.should_quit {
                self.transport.stop();
                break;
            }
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let state = self.state.read().clone();
        render_transport(frame, chunks[0], &state, self.tap.len());
        render_grid(
            frame,
            chunks[1],
            &state.pattern,
            &self.grid_state,
            state.current_step,
            state.meter.beats_per_cycle(),
        );
        render_help(frame, chunks[2]);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let beats = self.state.read().meter.beats_per_cycle();
        let cursor_voice = Voice::from_index(self.grid_state.cursor_voice);

        let cmd = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Left => {
                self.grid_state.move_cursor(-1, 0, beats);
                return;
            }
            KeyCode::Right => {
                self.grid_state.move_cursor(1, 0, beats);
                return;
            }
            KeyCode::Up => {
                self.grid_state.move_cursor(0, -1, beats);
                return;
            }
            KeyCode::Down => {
                self.grid_state.move_cursor(0, 1, beats);
                return;
            }
            KeyCode::Char(' ') => Some(Command::TogglePlayback),
            KeyCode::Char('t') => Some(Command::Tap),
            KeyCode::Enter | KeyCode::Char('x') => cursor_voice.map(|voice| Command::ToggleStep {
                voice,
                step: self.grid_state.cursor_step,
            }),
            KeyCode::Char('c') => cursor_voice.map(Command::ClearVoice),
            KeyCode::Char('f') => cursor_voice.map(Command::FillVoice),
            KeyCode::Char('C') => Some(Command::ClearPattern),
            KeyCode::Char('b') => Some(Command::SeedBasicBeat),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Command::AdjustBpm(1.0)),
            KeyCode::Char('-') => Some(Command::AdjustBpm(-1.0)),
            KeyCode::Char('[') => Some(Command::AdjustBeats(-1)),
            KeyCode::Char(']') => Some(Command::AdjustBeats(1)),
            KeyCode::Char('{') => Some(Command::AdjustSubdivision(-1)),
            KeyCode::Char('}') => Some(Command::AdjustSubdivision(1)),
            _ => None,
        };

        if let Some(cmd) = cmd {
            self.command_sender.send(cmd);
        }
    }

    fn apply_command(&mut self, cmd: Command) {
        match cmd {
            Command::TogglePlayback => self.transport.toggle(),
            Command::Play => self.transport.play(),
            Command::Stop => self.transport.stop(),
            Command::SetBpm(bpm) => self.state.write().set_bpm(bpm),
            Command::AdjustBpm(delta) => {
                let mut state = self.state.write();
                let bpm = state.bpm + delta;
                state.set_bpm(bpm);
            }
            Command::Tap => {
                let now_ms = self.epoch.elapsed().as_secs_f64() * 1000.0;
                if let Some(bpm) = self.tap.tap(now_ms) {
                    self.state.write().set_bpm(bpm);
                }
            }
            Command::AdjustBeats(delta) => {
                let mut state = self.state.write();
                let beats = (state.meter.beats_per_cycle() as i32 + delta).max(1) as usize;
                state.meter.set_beats_per_cycle(beats);
                self.grid_state.clamp_to(state.meter.beats_per_cycle());
            }
            Command::AdjustSubdivision(delta) => {
                let mut state = self.state.write();
                let subdivision = (state.meter.subdivision() as i32 + delta).max(1) as usize;
                state.meter.set_subdivision(subdivision);
            }
            Command::ToggleStep { voice, step } => {
                self.state.write().pattern.toggle(voice, step);
            }
            Command::ClearVoice(voice) => self.state.write().pattern.clear_voice(voice),
            Command::FillVoice(voice) => self.state.write().pattern.fill_voice(voice),
            Command::ClearPattern => self.state.write().pattern.clear_all(),
            Command::SeedBasicBeat => {
                self.state.write().pattern = crate::sequencer::Pattern::basic_beat();
            }
        }
    }
}

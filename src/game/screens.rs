use std::sync::Arc;

use super::widgets::{Button, TextInput};
use super::{Event, Frame, Key, Rect, Screen, Transition, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::client::{LoginBackend, LoginOutcome};

const TITLE: &str = "HenaGame";
const BLINK_SECS: f32 = 0.6;

/// Title screen. ENTER goes to the login form, ESC quits.
pub struct MenuScreen {
    backend: Arc<dyn LoginBackend>,
    blink_timer: f32,
    show_press_start: bool,
}

impl MenuScreen {
    pub fn new(backend: Arc<dyn LoginBackend>) -> Self {
        Self {
            backend,
            blink_timer: 0.0,
            show_press_start: true,
        }
    }
}

impl Screen for MenuScreen {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn handle_event(&mut self, event: &Event) -> Transition {
        match event {
            Event::KeyDown(Key::Enter) => {
                Transition::Switch(Box::new(LoginScreen::new(self.backend.clone())))
            }
            Event::KeyDown(Key::Escape) => Transition::Quit,
            _ => Transition::None,
        }
    }

    fn update(&mut self, dt: f32) {
        self.blink_timer += dt;
        if self.blink_timer >= BLINK_SECS {
            self.blink_timer = 0.0;
            self.show_press_start = !self.show_press_start;
        }
    }

    fn render(&self, frame: &mut Frame) {
        frame.draw(TITLE);
        if self.show_press_start {
            frame.draw("Press ENTER to Start");
        }
        frame.draw("ESC to Quit");
    }
}

/// Username/password form that submits to a [`LoginBackend`].
///
/// TAB cycles focus, ENTER in the username field moves to the password,
/// ENTER in the password field or the Login button submits. A successful
/// login switches to gameplay carrying the issued token.
pub struct LoginScreen {
    backend: Arc<dyn LoginBackend>,
    username: TextInput,
    password: TextInput,
    button: Button,
    status: Option<String>,
}

impl LoginScreen {
    pub fn new(backend: Arc<dyn LoginBackend>) -> Self {
        let center_x = WINDOW_WIDTH / 2;
        let mut username = TextInput::new(Rect::new(center_x - 150, 180, 300, 50), "Username");
        username.focused = true;
        Self {
            backend,
            username,
            password: TextInput::new(Rect::new(center_x - 150, 250, 300, 50), "Password").masked(),
            button: Button::new(Rect::new(center_x - 100, 330, 200, 60), "Login"),
            status: None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn username_input(&mut self) -> &mut TextInput {
        &mut self.username
    }

    pub fn password_input(&mut self) -> &mut TextInput {
        &mut self.password
    }

    fn cycle_focus(&mut self) {
        if self.username.focused {
            self.username.focused = false;
            self.password.focused = true;
        } else if self.password.focused {
            self.password.focused = false;
            self.username.focused = true;
        } else {
            self.username.focused = true;
        }
    }

    fn submit(&mut self) -> Transition {
        let username = self.username.value().to_owned();
        match self.backend.login(&username, self.password.value()) {
            LoginOutcome::Success(token) => {
                tracing::info!(username = %username, "login successful");
                Transition::Switch(Box::new(GameplayScreen::new(self.backend.clone(), Some(token))))
            }
            LoginOutcome::Rejected(status) => {
                tracing::info!(status, "login failed");
                self.status = Some(format!("Login failed ({status})"));
                Transition::None
            }
            LoginOutcome::Unreachable(reason) => {
                tracing::warn!(%reason, "login error");
                self.status = Some(format!("Login error: {reason}"));
                Transition::None
            }
        }
    }
}

impl Screen for LoginScreen {
    fn name(&self) -> &'static str {
        "login"
    }

    fn handle_event(&mut self, event: &Event) -> Transition {
        match event {
            Event::KeyDown(Key::Escape) => return Transition::Quit,
            Event::KeyDown(Key::Tab) => {
                self.cycle_focus();
                return Transition::None;
            }
            _ => {}
        }

        if self.username.handle_event(event).is_some() {
            self.cycle_focus();
            return Transition::None;
        }
        let submitted = self.password.handle_event(event).is_some();
        let clicked = self.button.handle_event(event);
        if submitted || clicked {
            return self.submit();
        }
        Transition::None
    }

    fn update(&mut self, dt: f32) {
        self.username.update(dt);
        self.password.update(dt);
    }

    fn render(&self, frame: &mut Frame) {
        frame.draw(TITLE);
        self.username.render(frame);
        self.password.render(frame);
        self.button.render(frame);
        if let Some(status) = &self.status {
            frame.draw(status.as_str());
        }
        frame.draw("ESC to Quit");
    }
}

/// A square bouncing around the window. ESC returns to the menu.
pub struct GameplayScreen {
    backend: Arc<dyn LoginBackend>,
    token: Option<String>,
    pos: (f32, f32),
    size: f32,
    vel: (f32, f32),
}

impl GameplayScreen {
    pub fn new(backend: Arc<dyn LoginBackend>, token: Option<String>) -> Self {
        Self {
            backend,
            token,
            pos: (100.0, 100.0),
            size: 60.0,
            vel: (180.0, 140.0),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn position(&self) -> (f32, f32) {
        self.pos
    }

    pub fn velocity(&self) -> (f32, f32) {
        self.vel
    }
}

impl Screen for GameplayScreen {
    fn name(&self) -> &'static str {
        "gameplay"
    }

    fn handle_event(&mut self, event: &Event) -> Transition {
        match event {
            Event::KeyDown(Key::Escape) => Transition::Switch(Box::new(MenuScreen::new(self.backend.clone()))),
            _ => Transition::None,
        }
    }

    fn update(&mut self, dt: f32) {
        self.pos.0 += self.vel.0 * dt;
        self.pos.1 += self.vel.1 * dt;

        let (w, h) = (WINDOW_WIDTH as f32, WINDOW_HEIGHT as f32);
        if self.pos.0 <= 0.0 || self.pos.0 + self.size >= w {
            self.vel.0 = -self.vel.0;
            self.pos.0 = self.pos.0.clamp(0.0, w - self.size);
        }
        if self.pos.1 <= 0.0 || self.pos.1 + self.size >= h {
            self.vel.1 = -self.vel.1;
            self.pos.1 = self.pos.1.clamp(0.0, h - self.size);
        }
    }

    fn render(&self, frame: &mut Frame) {
        frame.draw("Gameplay - ESC for Menu");
        frame.draw(format!("square at ({:.0}, {:.0})", self.pos.0, self.pos.1));
        if self.token.is_some() {
            frame.draw("signed in");
        }
    }
}

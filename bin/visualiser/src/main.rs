use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use std::collections::VecDeque;
use std::env;
use std::time::Instant;

use common::{
    load_config, FixedStep, FrameStatus, InputEvent, Point2D, Simulation, SimulationConfig,
};

/// Ticks of position kept for the side-panel trace.
const TRAIL_LEN: usize = 600;
const SIDE_PANEL_WIDTH: f32 = 300.0;

struct VisualiserApp {
    sim: Simulation,
    /// Repaints follow input events, ticks follow the configured rate.
    pacer: FixedStep,
    last_update: Instant,
    trail: VecDeque<(u64, Point2D)>,
    closing: bool,
}

/// What the pointer and keyboard did since the last frame.
#[derive(Default)]
struct FrameInput {
    events: Vec<InputEvent>,
    reset: bool,
}

impl VisualiserApp {
    fn new(sim: Simulation) -> Self {
        Self {
            pacer: FixedStep::new(sim.config().tick_period()),
            last_update: Instant::now(),
            sim,
            trail: VecDeque::with_capacity(TRAIL_LEN),
            closing: false,
        }
    }

    fn record_trail(&mut self) {
        if self.trail.len() == TRAIL_LEN {
            self.trail.pop_front();
        }
        self.trail
            .push_back((self.sim.tick_count(), self.sim.agent().position()));
    }

    fn reset(&mut self) {
        self.sim.reset();
        self.pacer.clear();
        self.trail.clear();
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("PID drone");
        ui.separator();

        let gains = self.sim.controller().gains();
        let snapshot = self.sim.snapshot();
        let terms = self.sim.last_terms();
        let history = self.sim.agent().history();

        egui::Grid::new("state_grid")
            .num_columns(2)
            .spacing([20.0, 4.0])
            .striped(true)
            .show(ui, |ui| {
                ui.label("Gains (kp / ki / kd):");
                ui.label(format!("{} / {} / {}", gains.kp, gains.ki, gains.kd));
                ui.end_row();

                ui.label("Tick:");
                ui.label(format!("{}", snapshot.tick));
                ui.end_row();

                ui.label("Position:");
                ui.label(format!("{}", snapshot.position));
                ui.end_row();

                ui.label("Force:");
                ui.label(format!("{}", snapshot.force));
                ui.end_row();

                ui.label("Target:");
                ui.label(format!("{}", snapshot.target));
                ui.end_row();

                ui.label("History:");
                ui.label(format!("{} / {}", history.len(), history.capacity()));
                ui.end_row();

                ui.label("P term:");
                ui.label(format!("{}", terms.proportional));
                ui.end_row();

                ui.label("I term:");
                ui.label(format!("{}", terms.integral));
                ui.end_row();

                ui.label("D term:");
                ui.label(format!("{}", terms.derivative));
                ui.end_row();
            });

        ui.add_space(8.0);
        if ui.button("Reset (R)").clicked() {
            self.reset();
        }

        ui.add_space(8.0);
        ui.strong("Position trace");
        let xs: Vec<[f64; 2]> = self.trail.iter().map(|(t, p)| [*t as f64, p.x]).collect();
        let ys: Vec<[f64; 2]> = self.trail.iter().map(|(t, p)| [*t as f64, p.y]).collect();
        Plot::new("position_plot")
            .height(200.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .allow_zoom(false)
            .allow_drag(false)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::new(xs))
                        .name("x")
                        .color(egui::Color32::from_rgb(52, 152, 219)),
                );
                plot_ui.line(
                    Line::new(PlotPoints::new(ys))
                        .name("y")
                        .color(egui::Color32::from_rgb(46, 204, 113)),
                );
            });

        ui.add_space(8.0);
        ui.small("Left click: push drone. Right click: move target. Esc: quit.");
    }
}

/// Translates raw egui events over the canvas into simulation input.
fn collect_input(ctx: &egui::Context, canvas: egui::Rect) -> FrameInput {
    let to_frame = |pos: egui::Pos2| {
        let local = pos - canvas.min;
        Point2D::new(local.x as f64, local.y as f64)
    };

    let mut input = FrameInput::default();
    ctx.input(|i| {
        for event in &i.events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed: false,
                    ..
                } if canvas.contains(*pos) => match button {
                    egui::PointerButton::Primary => {
                        input.events.push(InputEvent::primary_click(to_frame(*pos)))
                    }
                    egui::PointerButton::Secondary => {
                        input.events.push(InputEvent::secondary_click(to_frame(*pos)))
                    }
                    _ => {}
                },
                egui::Event::PointerMoved(pos) if canvas.contains(*pos) => {
                    input.events.push(InputEvent::pointer_move(to_frame(*pos)));
                }
                egui::Event::Key {
                    key: egui::Key::Escape,
                    pressed: true,
                    ..
                } => input.events.push(InputEvent::Quit),
                egui::Event::Key {
                    key: egui::Key::R,
                    pressed: true,
                    ..
                } => input.reset = true,
                _ => {}
            }
        }
    });
    input
}

fn paint(painter: &egui::Painter, canvas: egui::Rect, sim: &Simulation) {
    let to_screen = |p: Point2D| canvas.min + egui::vec2(p.x as f32, p.y as f32);
    let snapshot = sim.snapshot();

    painter.rect_filled(canvas, 0.0, egui::Color32::WHITE);

    let drone = to_screen(snapshot.position);
    let body = egui::Color32::from_rgb(60, 60, 70);
    painter.rect_filled(
        egui::Rect::from_center_size(drone, egui::vec2(36.0, 20.0)),
        4.0,
        body,
    );
    for (dx, dy) in [(-30.0, -22.0), (30.0, -22.0), (-30.0, 22.0), (30.0, 22.0)] {
        let rotor = drone + egui::vec2(dx, dy);
        painter.line_segment([drone, rotor], egui::Stroke::new(3.0, body));
        painter.circle_stroke(rotor, 14.0, egui::Stroke::new(2.0, body));
    }

    painter.line_segment(
        [drone, to_screen(snapshot.applied_force)],
        egui::Stroke::new(1.0, egui::Color32::RED),
    );

    painter.circle_stroke(
        to_screen(snapshot.target),
        10.0,
        egui::Stroke::new(5.0, egui::Color32::BLACK),
    );
}

impl eframe::App for VisualiserApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::right("controls")
            .exact_width(SIDE_PANEL_WIDTH)
            .show(ctx, |ui| self.controls(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::click());
                let canvas = response.rect;

                let input = collect_input(ctx, canvas);
                if input.reset {
                    self.reset();
                }

                let now = Instant::now();
                let elapsed = now.saturating_duration_since(self.last_update);
                self.last_update = now;

                if !self.closing {
                    self.pacer.queue(input.events);
                    let (ticks, status) = self.pacer.advance(&mut self.sim, elapsed);
                    if status == FrameStatus::Quit {
                        self.closing = true;
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    if ticks > 0 {
                        self.record_trail();
                    }
                }

                paint(&painter, canvas, &self.sim);
            });

        ctx.request_repaint_after(self.pacer.until_next_tick());
    }
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path);
                config
            }
            Err(e) => {
                eprintln!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => {
            log::info!("No configuration file given, using defaults");
            SimulationConfig::default()
        }
    };

    let sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let frame = sim.config().frame;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([frame.width as f32 + SIDE_PANEL_WIDTH, frame.height as f32])
            .with_title("PID controller"),
        ..Default::default()
    };

    eframe::run_native(
        "PID controller",
        options,
        Box::new(move |_cc| Box::new(VisualiserApp::new(sim))),
    )
}

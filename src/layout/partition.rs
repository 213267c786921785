use std::borrow::Cow;

use crate::color::{ColorPolicy, ColorSpec};
use crate::error::Result;
use crate::geometry::Bounds;
use crate::item::{Item, prepare_items};
use crate::layout::config::LayoutConfig;
use crate::layout::measure::Measurement;
use crate::logging::{LAYOUT_TARGET, LogLevel, Logger};
use crate::registry::{Annotation, BuildStats, RectId, Rectangle, Registry};

/// Build the icicle registry for `items` in one pass.
///
/// Items are expected sorted by name with sentinel rows removed; input that
/// is not is prepared first, so the result never depends on caller order.
pub fn build(
    items: &[Item],
    spec: &ColorSpec,
    config: &LayoutConfig,
    policy: ColorPolicy,
) -> Result<Registry> {
    Partitioner::new(spec, config, policy).build(items)
}

/// Prefix partition builder bound to one colour spec, config and policy.
#[derive(Debug, Clone)]
pub struct Partitioner<'a> {
    spec: &'a ColorSpec,
    config: &'a LayoutConfig,
    policy: ColorPolicy,
    logger: Option<Logger>,
}

impl<'a> Partitioner<'a> {
    pub fn new(spec: &'a ColorSpec, config: &'a LayoutConfig, policy: ColorPolicy) -> Self {
        Self {
            spec,
            config,
            policy,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(&self, items: &[Item]) -> Result<Registry> {
        let normalized = normalize(items);
        let items: &[Item] = &normalized;
        let measurement = Measurement::for_items(self.config, items)?;
        let names: Vec<Vec<char>> = items.iter().map(|item| item.name.chars().collect()).collect();

        let mut scan = Scan {
            items,
            names: &names,
            measurement,
            spec: self.spec,
            config: self.config,
            policy: self.policy,
            registry: Registry::new(),
            stats: BuildStats {
                items: items.len(),
                ..BuildStats::default()
            },
        };
        scan.run();

        let Scan {
            mut registry,
            stats,
            ..
        } = scan;
        registry.set_stats(stats);
        self.report(&registry, measurement);
        Ok(registry)
    }

    fn report(&self, registry: &Registry, measurement: Measurement) {
        let Some(logger) = &self.logger else {
            return;
        };
        let mut fields = registry.stats().as_fields();
        fields.insert("row_height".to_string(), measurement.row_height.into());
        fields.insert("char_width".to_string(), measurement.char_width.into());
        fields.insert("policy".to_string(), self.policy.as_str().into());
        let (level, message) = if registry.is_empty() {
            (LogLevel::Info, "no_run_reached_cutoff")
        } else {
            (LogLevel::Debug, "layout_built")
        };
        // Logging never fails a build.
        let _ = logger.log_with_fields(level, LAYOUT_TARGET, message, fields);
    }
}

/// Drop placeholders and sort, borrowing when the input is already clean.
fn normalize(items: &[Item]) -> Cow<'_, [Item]> {
    let clean = items.iter().all(|item| !item.is_placeholder())
        && items.is_sorted_by(|a, b| a.name <= b.name);
    if clean {
        Cow::Borrowed(items)
    } else {
        Cow::Owned(prepare_items(items.iter().cloned()))
    }
}

/// Contiguous slice of the sorted input whose first `offset` characters were
/// consumed by ancestors.
#[derive(Debug, Clone)]
struct Frame {
    start: usize,
    end: usize,
    offset: usize,
    x: f64,
    y: f64,
    path: String,
    parent: Option<RectId>,
    depth: usize,
}

/// Maximal block of a frame sharing at least its first remaining character.
#[derive(Debug, Clone)]
struct Run {
    start: usize,
    end: usize,
    overlap: usize,
    y0: f64,
    y1: f64,
}

enum Task {
    Split(Frame),
    Emit(Frame, Run),
}

struct Scan<'s> {
    items: &'s [Item],
    names: &'s [Vec<char>],
    measurement: Measurement,
    spec: &'s ColorSpec,
    config: &'s LayoutConfig,
    policy: ColorPolicy,
    registry: Registry,
    stats: BuildStats,
}

impl Scan<'_> {
    /// Depth-first traversal on an explicit stack: a frame's runs are pushed
    /// in reverse so the first run and all its descendants are inserted
    /// before the next sibling run, giving pre-order registry order.
    fn run(&mut self) {
        let mut stack = vec![Task::Split(Frame {
            start: 0,
            end: self.items.len(),
            offset: 0,
            x: 0.0,
            y: 0.0,
            path: String::new(),
            parent: None,
            depth: 0,
        })];

        while let Some(task) = stack.pop() {
            match task {
                Task::Split(frame) => {
                    let runs = self.split(&frame);
                    stack.extend(runs.into_iter().rev().map(|run| Task::Emit(frame.clone(), run)));
                }
                Task::Emit(frame, run) => {
                    if let Some(child) = self.emit(&frame, &run) {
                        stack.push(Task::Split(child));
                    }
                }
            }
        }
    }

    /// Cut a frame into runs wherever two neighbours share no character.
    ///
    /// A run's overlap is the minimum shared length over all its adjacent
    /// pairs, starting from the first member's full remaining length.
    fn split(&self, frame: &Frame) -> Vec<Run> {
        let mut runs = Vec::new();
        if frame.start >= frame.end {
            return runs;
        }

        let remaining = |idx: usize| &self.names[idx][frame.offset..];
        let mut run_start = frame.start;
        let mut overlap = remaining(frame.start).len();

        for idx in frame.start + 1..frame.end {
            let shared = shared_prefix_len(remaining(idx - 1), remaining(idx));
            if shared == 0 {
                runs.push(self.run_span(frame, run_start, idx, overlap));
                run_start = idx;
                overlap = remaining(idx).len();
            } else {
                overlap = overlap.min(shared);
            }
        }
        runs.push(self.run_span(frame, run_start, frame.end, overlap));
        runs
    }

    fn run_span(&self, frame: &Frame, start: usize, end: usize, overlap: usize) -> Run {
        // Both edges derive from the frame origin so neighbouring runs share
        // bit-identical boundaries.
        let row = self.measurement.row_height;
        Run {
            start,
            end,
            overlap,
            y0: frame.y + (start - frame.start) as f64 * row,
            y1: frame.y + (end - frame.start) as f64 * row,
        }
    }

    /// Insert the run's rectangle and annotation; return the frame of members
    /// that continue past the shared prefix.
    fn emit(&mut self, frame: &Frame, run: &Run) -> Option<Frame> {
        self.stats.runs_scanned += 1;
        let count = run.end - run.start;
        let cutoff = self.config.cutoff as usize;
        if count < cutoff {
            self.stats.runs_dropped += 1;
            return None;
        }

        let prefix_end = frame.offset + run.overlap;
        let display_text: String = self.names[run.start][frame.offset..prefix_end].iter().collect();
        let path = format!("{}{}", frame.path, display_text);
        let base_color = self.policy.resolve(
            self.spec,
            self.items[run.start..run.end]
                .iter()
                .map(|item| item.category.as_deref()),
        );
        let x1 = frame.x + run.overlap as f64 * self.measurement.char_width;
        let bounds = Bounds::new(frame.x, run.y0, x1, run.y1);

        let rect = Rectangle::new(
            path.clone(),
            display_text,
            bounds,
            base_color,
            count,
            frame.depth,
        );
        let id = self.registry.insert(rect, frame.parent);
        self.stats.rectangles += 1;
        self.stats.max_depth = self.stats.max_depth.max(frame.depth);

        // Names equal to the prefix sort ahead of their extensions.
        let ended = (run.start..run.end)
            .take_while(|&idx| self.names[idx].len() == prefix_end)
            .count();
        let continuing = count - ended;

        if ended >= cutoff {
            let band_top = run.y0 + continuing as f64 * self.measurement.row_height;
            self.registry.push_annotation(Annotation::new(
                path.clone(),
                ended,
                f64::from(self.config.canvas_width),
                band_top,
                run.y1,
            ));
            self.stats.annotations += 1;
        }

        (continuing > 0).then(|| Frame {
            start: run.start + ended,
            end: run.end,
            offset: prefix_end,
            x: x1,
            y: run.y0,
            path,
            parent: Some(id),
            depth: frame.depth + 1,
        })
    }
}

fn shared_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::error::IcicleError;
    use crate::logging::MemorySink;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn spec() -> ColorSpec {
        ColorSpec::new(vec!["F".into(), "M".into()], vec![RED, BLUE], Rgb::NEUTRAL).unwrap()
    }

    fn anns() -> Vec<Item> {
        vec![
            Item::new("Ann", Some("F")),
            Item::new("Anna", Some("F")),
            Item::new("Anne", Some("M")),
        ]
    }

    fn config(cutoff: u32) -> LayoutConfig {
        LayoutConfig::new(40, 30, cutoff, 10).unwrap()
    }

    #[test]
    fn ann_family_blends_and_splits() {
        let registry = build(&anns(), &spec(), &config(1), ColorPolicy::WeightedBlend).unwrap();
        assert_eq!(registry.len(), 3);

        let root = registry.by_path("Ann").unwrap();
        assert_eq!(root.display_text, "Ann");
        assert_eq!(root.item_count, 3);
        assert_eq!(root.base_color, Rgb::new(170, 0, 85));
        assert_eq!(root.bounds, Bounds::new(0.0, 0.0, 30.0, 30.0));

        let a = registry.by_path("Anna").unwrap();
        assert_eq!(a.display_text, "a");
        assert_eq!(a.item_count, 1);
        assert_eq!(a.base_color, RED);
        assert_eq!(a.bounds, Bounds::new(30.0, 0.0, 40.0, 10.0));

        let e = registry.by_path("Anne").unwrap();
        assert_eq!(e.display_text, "e");
        assert_eq!(e.base_color, BLUE);
        assert_eq!(e.bounds, Bounds::new(30.0, 10.0, 40.0, 20.0));

        let paths: Vec<_> = registry.iter().map(|(_, r)| r.path.as_str()).collect();
        assert_eq!(paths, vec!["Ann", "Anna", "Anne"]);

        let notes: Vec<_> = registry.annotations().iter().map(|n| n.text.as_str()).collect();
        assert_eq!(notes, vec!["Ann : 1", "Anna : 1", "Anne : 1"]);
        let note = &registry.annotations()[0];
        assert_eq!(note.text, "Ann : 1");
        assert_eq!((note.y0, note.y1), (20.0, 30.0));
        assert_eq!(note.anchor_x, 40.0);
    }

    #[test]
    fn cutoff_suppresses_small_children() {
        let registry = build(&anns(), &spec(), &config(2), ColorPolicy::WeightedBlend).unwrap();
        assert_eq!(registry.len(), 1);
        let root = registry.by_path("Ann").unwrap();
        assert_eq!(root.item_count, 3);
        assert!(root.is_leaf());
        assert!(registry.annotations().is_empty());
        assert_eq!(registry.stats().runs_dropped, 2);
    }

    #[test]
    fn identical_names_collapse() {
        let items = vec![Item::bare("Bob"), Item::bare("Bob"), Item::bare("Bob")];
        let registry = build(&items, &spec(), &config(1), ColorPolicy::Majority).unwrap();
        assert_eq!(registry.len(), 1);
        let bob = registry.by_path("Bob").unwrap();
        assert_eq!(bob.item_count, 3);
        assert!(bob.is_leaf());
        assert_eq!(bob.base_color, Rgb::NEUTRAL);
        assert_eq!(registry.annotations()[0].text, "Bob : 3");
    }

    #[test]
    fn runs_close_only_on_zero_overlap() {
        // "Al" ~ "Ali" share 2, "Ali" ~ "Amy" share 1: one run with overlap 1.
        let items = vec![Item::bare("Al"), Item::bare("Ali"), Item::bare("Amy"), Item::bare("Bo")];
        let registry = build(&items, &spec(), &config(1), ColorPolicy::WeightedBlend).unwrap();
        let paths: Vec<_> = registry.iter().map(|(_, r)| r.path.as_str()).collect();
        assert_eq!(paths, vec!["A", "Al", "Ali", "Amy", "Bo"]);
        assert_eq!(registry.by_path("A").unwrap().item_count, 3);
        assert_eq!(registry.by_path("Al").unwrap().item_count, 2);
        assert_eq!(registry.by_path("Al").unwrap().depth, 1);
        assert_eq!(registry.by_path("Ali").unwrap().depth, 2);
        assert_eq!(registry.stats().max_depth, 2);
    }

    #[test]
    fn children_start_at_parent_right_edge() {
        let items = vec![Item::bare("Al"), Item::bare("Ali"), Item::bare("Amy")];
        let registry = build(&items, &spec(), &config(1), ColorPolicy::WeightedBlend).unwrap();
        for (id, parent) in registry.iter() {
            for child in registry.children_of(id) {
                assert_eq!(child.bounds.x0, parent.bounds.x1);
                assert!(child.bounds.y0 >= parent.bounds.y0);
                assert!(child.bounds.y1 <= parent.bounds.y1);
            }
        }
    }

    #[test]
    fn single_survivor_after_sentinels() {
        let items = vec![Item::bare("-1"), Item::new("Eve", Some("F")), Item::bare("-1")];
        let registry = build(&items, &spec(), &config(1), ColorPolicy::WeightedBlend).unwrap();
        assert_eq!(registry.len(), 1);
        let eve = registry.by_path("Eve").unwrap();
        assert_eq!(eve.bounds, Bounds::new(0.0, 0.0, 40.0, 30.0));
        assert_eq!(eve.base_color, RED);
    }

    #[test]
    fn only_sentinels_is_empty_input() {
        let items = vec![Item::bare("-1"), Item::bare("")];
        let err = build(&items, &spec(), &config(1), ColorPolicy::WeightedBlend).unwrap_err();
        assert!(matches!(err, IcicleError::EmptyInput));
    }

    #[test]
    fn nothing_reaching_cutoff_is_empty_registry() {
        let items = vec![Item::bare("Al"), Item::bare("Bo")];
        let registry = build(&items, &spec(), &config(5), ColorPolicy::WeightedBlend).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.stats().runs_dropped, 2);
    }

    #[test]
    fn unsorted_input_is_prepared() {
        let mut items = anns();
        items.reverse();
        let sorted = build(&anns(), &spec(), &config(1), ColorPolicy::WeightedBlend).unwrap();
        let reversed = build(&items, &spec(), &config(1), ColorPolicy::WeightedBlend).unwrap();
        assert_eq!(sorted.fingerprint(), reversed.fingerprint());
    }

    #[test]
    fn deep_near_identical_names_do_not_overflow() {
        let base = "x".repeat(2000);
        let items: Vec<Item> = (0..600)
            .map(|i| Item::bare(format!("{base}{}", "y".repeat(i))))
            .collect();
        let config = LayoutConfig::new(1000, 1000, 1, 1).unwrap();
        let registry = build(&items, &spec(), &config, ColorPolicy::WeightedBlend).unwrap();
        assert_eq!(registry.stats().max_depth, 599);
        assert_eq!(registry.len(), 600);
    }

    #[test]
    fn logger_receives_build_summary() {
        let sink = MemorySink::new();
        let spec = spec();
        let config = config(1);
        let registry = Partitioner::new(&spec, &config, ColorPolicy::Majority)
            .with_logger(Logger::new(sink.clone()))
            .build(&anns())
            .unwrap();
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "layout_built");
        assert_eq!(
            events[0].fields.get("rectangles").and_then(|v| v.as_u64()),
            Some(registry.len() as u64)
        );
    }
}

//! Splits the question list into steps and decides when a step is complete.

use mestermind_types::{Answers, Question, RequestDetails};
use serde::{Deserialize, Serialize};

/// Step that is not backed by questions of the set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraStep {
    Availability,
    Contact,
    Message,
}

impl ExtraStep {
    pub fn title(&self) -> &'static str {
        match self {
            ExtraStep::Availability => "When are you available?",
            ExtraStep::Contact => "How can professionals reach you?",
            ExtraStep::Message => "Anything else the professional should know?",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowVariant {
    /// One question per step, then availability, contact and message
    #[default]
    Guided,
    /// Three questions per step, then contact only
    Preview,
}

impl FlowVariant {
    pub fn questions_per_step(&self) -> usize {
        match self {
            FlowVariant::Guided => 1,
            FlowVariant::Preview => 3,
        }
    }

    pub fn extra_steps(&self) -> &'static [ExtraStep] {
        match self {
            FlowVariant::Guided => &[ExtraStep::Availability, ExtraStep::Contact, ExtraStep::Message],
            FlowVariant::Preview => &[ExtraStep::Contact],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepView<'a> {
    Questions(&'a [Question]),
    Extra(ExtraStep),
}

#[derive(Debug, Clone)]
pub struct StepSequencer {
    variant: FlowVariant,
    questions: Vec<Question>,
    current: usize,
}

impl StepSequencer {
    pub fn new(variant: FlowVariant, questions: Vec<Question>) -> Self {
        Self {
            variant,
            questions,
            current: 0,
        }
    }

    pub fn variant(&self) -> FlowVariant {
        self.variant
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, key: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.key == key)
    }

    /// Steps that render questions
    pub fn base_total_steps(&self) -> usize {
        self.questions
            .len()
            .div_ceil(self.variant.questions_per_step())
    }

    pub fn total_steps(&self) -> usize {
        self.base_total_steps() + self.variant.extra_steps().len()
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    /// Moves to `step`, clamped to the last step; returns the step landed on
    pub fn set_current_step(&mut self, step: usize) -> usize {
        self.current = step.min(self.last_step());
        self.current
    }

    pub fn last_step(&self) -> usize {
        self.total_steps() - 1
    }

    pub fn is_last_step(&self) -> bool {
        self.current == self.last_step()
    }

    /// Index of the first step after the questions
    pub fn first_extra_step(&self) -> usize {
        self.base_total_steps()
    }

    pub fn step_of(&self, extra: ExtraStep) -> Option<usize> {
        self.variant
            .extra_steps()
            .iter()
            .position(|e| *e == extra)
            .map(|offset| self.base_total_steps() + offset)
    }

    pub fn advance(&mut self) -> usize {
        self.set_current_step(self.current + 1)
    }

    pub fn retreat(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// `(current + 1) / total`
    pub fn progress(&self) -> f64 {
        (self.current + 1) as f64 / self.total_steps() as f64
    }

    pub fn view(&self) -> StepView<'_> {
        self.view_at(self.current)
    }

    pub fn view_at(&self, step: usize) -> StepView<'_> {
        let base = self.base_total_steps();
        if step < base {
            let per_step = self.variant.questions_per_step();
            let start = step * per_step;
            let end = (start + per_step).min(self.questions.len());
            StepView::Questions(&self.questions[start..end])
        } else {
            let extras = self.variant.extra_steps();
            let offset = (step - base).min(extras.len() - 1);
            StepView::Extra(extras[offset])
        }
    }

    /// Required questions of `step` that still lack an answer
    pub fn missing_required(&self, step: usize, answers: &Answers) -> Vec<&Question> {
        match self.view_at(step) {
            StepView::Questions(questions) => questions
                .iter()
                .filter(|q| q.is_required && !q.question_type.is_answered(answers.get(&q.key)))
                .collect(),
            StepView::Extra(_) => Vec::new(),
        }
    }

    pub fn is_step_valid(&self, step: usize, answers: &Answers, details: &RequestDetails) -> bool {
        match self.view_at(step) {
            StepView::Questions(_) => self.missing_required(step, answers).is_empty(),
            StepView::Extra(ExtraStep::Availability) => details
                .availability
                .as_ref()
                .map_or(true, |availability| availability.is_valid()),
            StepView::Extra(ExtraStep::Contact) => details.contact.is_reachable(),
            StepView::Extra(ExtraStep::Message) => true,
        }
    }

    pub fn is_current_step_valid(&self, answers: &Answers, details: &RequestDetails) -> bool {
        self.is_step_valid(self.current, answers, details)
    }
}

use async_trait::async_trait;

use crate::error::Result;
use crate::model::QuestionnaireData;

/// External collaborator that fetches the questionnaire definition document.
/// The only suspension point in the engine; everything downstream is
/// synchronous.
#[async_trait]
pub trait QuestionnaireSource: Send + Sync {
    async fn fetch(&self) -> Result<QuestionnaireData>;
}

/// Source backed by an already-loaded document. Useful for tests and for
/// embedders that obtain the document through their own transport.
pub struct InMemoryQuestionnaireSource {
    data: QuestionnaireData,
}

impl InMemoryQuestionnaireSource {
    pub fn new(data: QuestionnaireData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl QuestionnaireSource for InMemoryQuestionnaireSource {
    async fn fetch(&self) -> Result<QuestionnaireData> {
        Ok(self.data.clone())
    }
}

//! セッションとアダプタの結線
//!
//! アップロード → 保持 → 分類要求 → アダプタ → 結果反映 を一本化する。
//! UIはワーカースレッドを使うため Session を直接扱うが、同じ遷移を通る。

use std::path::Path;

use classifier_common::{
    FileCandidate, ResultView, Session, SessionState, UploadPolicy, UploadRejection,
};
use tracing::debug;

use crate::classifier::Classifier;
use crate::upload::read_candidate_with;

pub struct Orchestrator<C> {
    session: Session,
    classifier: C,
}

impl<C: Classifier> Orchestrator<C> {
    pub fn new(classifier: C) -> Self {
        Self::with_policy(classifier, UploadPolicy::default())
    }

    pub fn with_policy(classifier: C, policy: UploadPolicy) -> Self {
        Self {
            session: Session::new(policy),
            classifier,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn view(&self) -> ResultView {
        ResultView::from_state(self.session.state())
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn receive_upload(&mut self, candidate: FileCandidate) -> Result<(), UploadRejection> {
        self.session.receive_upload(candidate)
    }

    /// ファイルを読み込んでアップロードする（読み込み失敗もエラー表示）
    ///
    /// 上限を超えるファイルは読み込まずに拒否する
    pub fn receive_file(&mut self, path: &Path) -> Result<(), UploadRejection> {
        match read_candidate_with(path, self.session.upload_control().policy()) {
            Ok(candidate) => self.session.receive_upload(candidate),
            Err(rejection) => {
                self.session.record_rejection(&rejection);
                Err(rejection)
            }
        }
    }

    /// 分類を実行し、結果を反映する
    ///
    /// 画像未選択またはLoading中はアダプタを呼ばず `false`
    pub async fn classify(&mut self) -> bool {
        let Some(ticket) = self.session.trigger_classify() else {
            debug!(state = self.session.state().as_str(), "classify not started");
            return false;
        };
        let outcome = self.classifier.classify(ticket.payload()).await;
        self.session.complete(&ticket, outcome)
    }
}

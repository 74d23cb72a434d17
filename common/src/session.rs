//! セッション状態機械
//!
//! UIツールキットに依存しない遷移関数群:
//! - receive_upload: アップロード（どの状態でも可）
//! - trigger_classify: 分類開始（画像あり、かつLoading以外）
//! - complete: アダプタ完了
//!
//! 状態は Idle / Loading / Error / Result のいずれか一つのみ

use tracing::{debug, info, warn};

use crate::error::{ClassifyError, UploadRejection};
use crate::types::{ClassificationResult, FileCandidate, ImagePayload};
use crate::upload::{UploadControl, UploadedImage};
use crate::validation::UploadPolicy;

/// 画像未選択で分類を要求した場合のメッセージ
pub const NO_IMAGE_MESSAGE: &str = "Vui lòng tải lên một hình ảnh trước.";

/// 表示状態
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Loading,
    Error(String),
    Result(ClassificationResult),
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::Error(_) => "error",
            SessionState::Result(_) => "result",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}

/// 実行中の分類要求
#[derive(Debug, Clone)]
pub struct ClassifyTicket {
    id: u64,
    payload: ImagePayload,
}

impl ClassifyTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }
}

/// セッション（1ウィンドウ分の状態）
#[derive(Debug, Default)]
pub struct Session {
    upload: UploadControl,
    image: Option<UploadedImage>,
    state: SessionState,
    next_ticket: u64,
    in_flight: Option<u64>,
    upload_notice: Option<String>,
}

impl Session {
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            upload: UploadControl::new(policy),
            ..Default::default()
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    /// Loading中に拒否されたアップロードのメッセージ（アップロード欄に表示）
    pub fn upload_notice(&self) -> Option<&str> {
        self.upload_notice.as_deref()
    }

    pub fn upload_control(&self) -> &UploadControl {
        &self.upload
    }

    /// 分類ボタンの有効判定
    pub fn can_classify(&self) -> bool {
        self.image.is_some() && !self.state.is_loading()
    }

    /// アップロードを受け付ける
    ///
    /// 成功時は結果・エラーをクリアして画像を置き換える（古いプレビュー参照はここで解放）。
    /// 失敗時は保持中の画像に触れずエラーを表示する。
    /// Loading中は実行中の要求を中断しないため、状態はLoadingのまま。
    pub fn receive_upload(&mut self, candidate: FileCandidate) -> Result<(), UploadRejection> {
        match self.upload.submit(candidate) {
            Ok(image) => {
                self.image = Some(image);
                self.upload_notice = None;
                if !self.state.is_loading() {
                    self.state = SessionState::Idle;
                }
                Ok(())
            }
            Err(rejection) => {
                self.record_rejection(&rejection);
                Err(rejection)
            }
        }
    }

    /// アップロード失敗を表示する（ファイル読み込み失敗もここを通す）
    ///
    /// Loading中は状態を変えず、通知として保持する
    pub fn record_rejection(&mut self, rejection: &UploadRejection) {
        if self.state.is_loading() {
            warn!("upload rejected while classification in flight: {}", rejection);
            self.upload_notice = Some(rejection.to_string());
        } else {
            self.upload_notice = None;
            self.state = SessionState::Error(rejection.to_string());
        }
    }

    /// 分類を開始する
    ///
    /// 画像がなければエラー状態にして `None`。Loading中は何もせず `None`。
    pub fn trigger_classify(&mut self) -> Option<ClassifyTicket> {
        if self.state.is_loading() {
            debug!("classify ignored: already loading");
            return None;
        }

        let Some(image) = &self.image else {
            self.state = SessionState::Error(NO_IMAGE_MESSAGE.to_string());
            return None;
        };

        self.next_ticket += 1;
        let ticket = ClassifyTicket {
            id: self.next_ticket,
            payload: image.payload(),
        };
        self.in_flight = Some(ticket.id);
        self.upload_notice = None;
        self.state = SessionState::Loading;
        debug!(ticket = ticket.id, size = ticket.payload.len(), "classify started");
        Some(ticket)
    }

    /// アダプタの結果を反映する
    ///
    /// 実行中の要求と一致しないチケットは無視して `false` を返す
    pub fn complete(
        &mut self,
        ticket: &ClassifyTicket,
        outcome: Result<ClassificationResult, ClassifyError>,
    ) -> bool {
        if self.in_flight != Some(ticket.id) {
            warn!(ticket = ticket.id, "stale classify result ignored");
            return false;
        }
        self.in_flight = None;

        self.state = match outcome {
            Ok(result) => {
                info!(object = result.object(), confidence = result.confidence(), "classified");
                SessionState::Result(result)
            }
            Err(err) => {
                warn!("classify failed: {:?}", err);
                SessionState::Error(err.to_string())
            }
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::MAX_UPLOAD_BYTES;

    fn jpeg(name: &str, bytes: &[u8]) -> FileCandidate {
        FileCandidate::new(name, "image/jpeg", bytes.to_vec())
    }

    #[test]
    fn test_initial_state() {
        let session = Session::default();
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.image().is_none());
        assert!(!session.can_classify());
    }

    #[test]
    fn test_upload_then_classify_success() {
        let mut session = Session::default();
        session.receive_upload(jpeg("cat.jpg", &[1, 2, 3])).expect("受付失敗");
        assert!(session.can_classify());

        let ticket = session.trigger_classify().expect("チケットなし");
        assert_eq!(session.state(), &SessionState::Loading);
        assert_eq!(ticket.payload().data(), &[1, 2, 3]);
        assert!(!session.can_classify());

        let result = ClassificationResult::new("mèo", 0.87).expect("生成失敗");
        assert!(session.complete(&ticket, Ok(result.clone())));
        assert_eq!(session.state(), &SessionState::Result(result));
    }

    #[test]
    fn test_classify_failure_sets_error() {
        let mut session = Session::default();
        session.receive_upload(jpeg("cat.jpg", &[1])).expect("受付失敗");
        let ticket = session.trigger_classify().expect("チケットなし");

        session.complete(&ticket, Err(ClassifyError::malformed("missing field `confidence`")));
        match session.state() {
            SessionState::Error(message) => assert!(message.contains("confidence")),
            other => panic!("Errorではない: {:?}", other),
        }
        // エラー後も画像は保持され、再実行できる
        assert!(session.can_classify());
    }

    #[test]
    fn test_trigger_without_image() {
        let mut session = Session::default();
        assert!(session.trigger_classify().is_none());
        assert_eq!(session.state(), &SessionState::Error(NO_IMAGE_MESSAGE.to_string()));
    }

    #[test]
    fn test_second_trigger_while_loading_is_ignored() {
        let mut session = Session::default();
        session.receive_upload(jpeg("cat.jpg", &[1])).expect("受付失敗");
        let first = session.trigger_classify();
        assert!(first.is_some());
        assert!(session.trigger_classify().is_none());
        assert_eq!(session.state(), &SessionState::Loading);
    }

    #[test]
    fn test_invalid_upload_keeps_image() {
        let mut session = Session::default();
        session.receive_upload(jpeg("cat.jpg", &[7, 7])).expect("受付失敗");
        let preview_id = session.image().map(|i| i.preview().id());

        let result = session.receive_upload(FileCandidate::new("doc.pdf", "application/pdf", vec![1]));
        assert!(matches!(result, Err(UploadRejection::InvalidFormat { .. })));
        assert!(matches!(session.state(), SessionState::Error(_)));

        let image = session.image().expect("画像が消えた");
        assert_eq!(image.name(), "cat.jpg");
        assert_eq!(image.data(), &[7, 7]);
        assert_eq!(Some(image.preview().id()), preview_id);
    }

    #[test]
    fn test_too_large_upload_keeps_image() {
        let mut session = Session::default();
        session.receive_upload(jpeg("cat.jpg", &[7])).expect("受付失敗");

        let big = FileCandidate::new("big.png", "image/png", vec![0; MAX_UPLOAD_BYTES as usize + 1]);
        let result = session.receive_upload(big);
        assert!(matches!(result, Err(UploadRejection::TooLarge { .. })));
        assert_eq!(session.image().map(|i| i.name()), Some("cat.jpg"));
        assert_eq!(session.upload_control().previews().live_count(), 1);
    }

    #[test]
    fn test_new_upload_clears_result() {
        let mut session = Session::default();
        session.receive_upload(jpeg("a.jpg", &[1])).expect("受付失敗");
        let ticket = session.trigger_classify().expect("チケットなし");
        session.complete(&ticket, Ok(ClassificationResult::new("chó", 0.6).expect("生成失敗")));

        session.receive_upload(jpeg("b.jpg", &[2])).expect("受付失敗");
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.image().map(|i| i.name()), Some("b.jpg"));
    }

    #[test]
    fn test_resubmit_same_file_replaces_preview() {
        let mut session = Session::default();
        session.receive_upload(jpeg("a.jpg", &[1])).expect("受付失敗");
        let first_id = session.image().map(|i| i.preview().id()).expect("画像なし");

        session.receive_upload(jpeg("a.jpg", &[1])).expect("受付失敗");
        let second_id = session.image().map(|i| i.preview().id()).expect("画像なし");

        assert_ne!(first_id, second_id);
        let previews = session.upload_control().previews();
        assert_eq!(previews.live_count(), 1);
        assert!(!previews.is_live(first_id));
    }

    #[test]
    fn test_upload_during_loading_does_not_abort() {
        let mut session = Session::default();
        session.receive_upload(jpeg("a.jpg", &[1])).expect("受付失敗");
        let ticket = session.trigger_classify().expect("チケットなし");

        session.receive_upload(jpeg("b.jpg", &[2])).expect("受付失敗");
        assert_eq!(session.state(), &SessionState::Loading);
        assert!(session.trigger_classify().is_none());

        let rejected = session.receive_upload(FileCandidate::new("c.gif", "image/gif", vec![3]));
        assert!(rejected.is_err());
        assert_eq!(session.state(), &SessionState::Loading);

        let result = ClassificationResult::new("mèo", 0.9).expect("生成失敗");
        assert!(session.complete(&ticket, Ok(result)));
        assert!(matches!(session.state(), SessionState::Result(_)));
        assert_eq!(session.image().map(|i| i.name()), Some("b.jpg"));
    }

    #[test]
    fn test_rejection_during_loading_kept_as_notice() {
        let mut session = Session::default();
        session.receive_upload(jpeg("a.jpg", &[1])).expect("受付失敗");
        let ticket = session.trigger_classify().expect("チケットなし");

        let rejected = session.receive_upload(FileCandidate::new("c.gif", "image/gif", vec![3]));
        let rejection = rejected.expect_err("拒否されていない");
        assert_eq!(session.state(), &SessionState::Loading);
        assert_eq!(session.upload_notice(), Some(rejection.to_string().as_str()));

        // 結果が届いても通知は残る
        let result = ClassificationResult::new("mèo", 0.9).expect("生成失敗");
        session.complete(&ticket, Ok(result));
        assert!(session.upload_notice().is_some());

        // 次のアップロード成功で消える
        session.receive_upload(jpeg("b.jpg", &[2])).expect("受付失敗");
        assert!(session.upload_notice().is_none());
    }

    #[test]
    fn test_rejection_when_idle_has_no_notice() {
        let mut session = Session::default();
        let _ = session.receive_upload(FileCandidate::new("c.gif", "image/gif", vec![3]));
        assert!(matches!(session.state(), SessionState::Error(_)));
        assert!(session.upload_notice().is_none());
    }

    #[test]
    fn test_stale_ticket_ignored() {
        let mut session = Session::default();
        session.receive_upload(jpeg("a.jpg", &[1])).expect("受付失敗");
        let ticket = session.trigger_classify().expect("チケットなし");
        session.complete(&ticket, Err(ClassifyError::Configuration));

        // 同じチケットで二度目の完了は無視
        let result = ClassificationResult::new("mèo", 0.9).expect("生成失敗");
        assert!(!session.complete(&ticket, Ok(result)));
        assert!(matches!(session.state(), SessionState::Error(_)));
    }
}

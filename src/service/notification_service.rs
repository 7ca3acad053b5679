// service/notification_service.rs
//
// Enquiry side effects run on one background worker fed by a bounded queue.
// Jobs are best effort: a failure is logged and never reaches the submitter.
use std::sync::Arc;

use anyhow::{anyhow, Context};
use serde_json::Value as JsonValue;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::{
    db::pagedb::PageExt,
    dtos::enquirydtos::EnquiryForm,
    mail::{
        mails::{ebook_email, enquiry_alert_email},
        sendmail::Mailer,
    },
    models::{enquirymodel::Enquiry, listingmodel::Collection},
    service::settings_service::SettingsService,
};

pub const EBOOK_PAGE_SLUG: &str = "ebook";

#[derive(Debug, Clone)]
pub enum NotificationJob {
    AdminAlert {
        enquiry: Enquiry,
        form: EnquiryForm,
    },
    EbookDelivery {
        enquiry_id: Uuid,
        name: String,
        email: String,
        collection: Option<Collection>,
    },
}

impl NotificationJob {
    pub fn for_enquiry(enquiry: &Enquiry, form: &EnquiryForm) -> Vec<NotificationJob> {
        let mut jobs = vec![NotificationJob::AdminAlert {
            enquiry: enquiry.clone(),
            form: form.clone(),
        }];

        if form.is_ebook() {
            if let Some(email) = &enquiry.email {
                jobs.push(NotificationJob::EbookDelivery {
                    enquiry_id: enquiry.id,
                    name: enquiry.name.clone(),
                    email: email.clone(),
                    collection: enquiry.collection,
                });
            }
        }

        jobs
    }

    fn kind(&self) -> &'static str {
        match self {
            NotificationJob::AdminAlert { .. } => "admin_alert",
            NotificationJob::EbookDelivery { .. } => "ebook_delivery",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<NotificationJob>,
}

impl NotificationQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<NotificationJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Never waits. Returns false when the job was dropped.
    pub fn enqueue(&self, job: NotificationJob) -> bool {
        let kind = job.kind();
        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Notification queue is full, dropping {} job", kind);
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::error!("Notification worker has stopped, dropping {} job", kind);
                false
            }
        }
    }
}

/// Picks the ebook PDF for a collection from the `ebook` page content:
/// `pdf_urls.<collection>` first, then `pdf_url`.
pub fn ebook_pdf_url(content: &JsonValue, collection: Option<Collection>) -> Option<String> {
    let non_empty = |value: Option<&JsonValue>| {
        value
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    };

    collection
        .and_then(|c| non_empty(content.get("pdf_urls").and_then(|urls| urls.get(c.as_str()))))
        .or_else(|| non_empty(content.get("pdf_url")))
}

/// Site-relative paths are made absolute. Other schemes are refused.
pub fn absolute_url(app_url: &str, url: &str) -> Option<String> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Some(url.to_string())
    } else if url.starts_with('/') && !url.starts_with("//") {
        Some(format!("{}{}", app_url.trim_end_matches('/'), url))
    } else {
        None
    }
}

pub struct NotificationWorker {
    receiver: mpsc::Receiver<NotificationJob>,
    mailer: Arc<dyn Mailer>,
    pages: Arc<dyn PageExt + Send + Sync>,
    settings: SettingsService,
    app_url: String,
}

impl NotificationWorker {
    pub fn new(
        receiver: mpsc::Receiver<NotificationJob>,
        mailer: Arc<dyn Mailer>,
        pages: Arc<dyn PageExt + Send + Sync>,
        settings: SettingsService,
        app_url: String,
    ) -> Self {
        Self {
            receiver,
            mailer,
            pages,
            settings,
            app_url,
        }
    }

    /// Drains the queue until every sender is dropped.
    pub async fn run(mut self) {
        tracing::info!("Notification worker started");

        while let Some(job) = self.receiver.recv().await {
            let kind = job.kind();
            match self.handle(job).await {
                Ok(()) => tracing::debug!("Notification job {} done", kind),
                Err(e) => tracing::error!("Notification job {} failed: {:#}", kind, e),
            }
        }

        tracing::info!("Notification worker stopped");
    }

    async fn handle(&self, job: NotificationJob) -> anyhow::Result<()> {
        match job {
            NotificationJob::AdminAlert { enquiry, form } => {
                let Some(recipient) = self
                    .settings
                    .admin_email()
                    .await
                    .context("loading admin email")?
                else {
                    tracing::warn!("No admin email configured, skipping alert for enquiry {}", enquiry.id);
                    return Ok(());
                };

                let message = enquiry_alert_email(&recipient, &enquiry, &form);
                self.mailer
                    .send(&message)
                    .await
                    .with_context(|| format!("sending admin alert for enquiry {}", enquiry.id))?;
            }
            NotificationJob::EbookDelivery {
                enquiry_id,
                name,
                email,
                collection,
            } => {
                let page = self
                    .pages
                    .get_page(EBOOK_PAGE_SLUG)
                    .await
                    .context("loading ebook page")?
                    .ok_or_else(|| anyhow!("ebook page is not configured"))?;

                let url = ebook_pdf_url(&page.content, collection)
                    .ok_or_else(|| anyhow!("ebook page has no PDF url"))?;
                let url = absolute_url(&self.app_url, &url)
                    .ok_or_else(|| anyhow!("ebook PDF url {:?} is not a web address", url))?;

                self.mailer
                    .send(&ebook_email(&email, &name, &url))
                    .await
                    .with_context(|| format!("sending ebook for enquiry {}", enquiry_id))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::{
        dtos::pagedtos::UpsertPageDto,
        mail::sendmail::{EmailMessage, MailError},
        models::{enquirymodel::EnquiryStatus, pagemodel::Page},
        service::settings_service::tests::MemorySettings,
    };

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
            if self.fail_for.as_deref() == Some(message.to.as_str()) {
                return Err(MailError::Smtp("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct EbookPage(Option<JsonValue>);

    #[async_trait]
    impl PageExt for EbookPage {
        async fn get_page(&self, slug: &str) -> Result<Option<Page>, sqlx::Error> {
            Ok(self.0.clone().filter(|_| slug == EBOOK_PAGE_SLUG).map(|content| Page {
                slug: slug.to_string(),
                title: Some("Ebook".to_string()),
                content,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        }

        async fn get_pages(&self) -> Result<Vec<Page>, sqlx::Error> {
            Ok(Vec::new())
        }

        async fn upsert_page(&self, _slug: &str, _dto: UpsertPageDto) -> Result<Page, sqlx::Error> {
            Err(sqlx::Error::RowNotFound)
        }

        async fn delete_page(&self, _slug: &str) -> Result<bool, sqlx::Error> {
            Ok(false)
        }
    }

    fn ebook_enquiry(collection: Option<Collection>) -> Enquiry {
        Enquiry {
            id: Uuid::new_v4(),
            enquiry_type: "EBOOK_ENQUIRY".to_string(),
            name: "Sam".to_string(),
            email: Some("buyer@example.com".to_string()),
            phone: None,
            collection,
            listing_id: None,
            status: EnquiryStatus::New,
            details: json!({ "type": "EBOOK_ENQUIRY" }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn run_jobs(
        jobs: Vec<NotificationJob>,
        mailer: Arc<RecordingMailer>,
        page: Option<JsonValue>,
    ) {
        let (queue, receiver) = NotificationQueue::new(8);
        let settings = SettingsService::new(
            Arc::new(MemorySettings::with(&[("adminEmail", json!("sales@example.com"))])),
            None,
        );
        let worker = NotificationWorker::new(
            receiver,
            mailer,
            Arc::new(EbookPage(page)),
            settings,
            "https://homes.example.com/".to_string(),
        );

        for job in jobs {
            assert!(queue.enqueue(job));
        }
        drop(queue);
        worker.run().await;
    }

    #[test]
    fn ebook_enquiries_fan_out_to_two_jobs() {
        let enquiry = ebook_enquiry(None);
        let jobs = NotificationJob::for_enquiry(&enquiry, &EnquiryForm::Ebook {});
        assert_eq!(jobs.len(), 2);

        let mut without_email = enquiry.clone();
        without_email.email = None;
        assert_eq!(NotificationJob::for_enquiry(&without_email, &EnquiryForm::Ebook {}).len(), 1);

        let contact = EnquiryForm::Contact {
            message: None,
            preferred_contact: None,
        };
        assert_eq!(NotificationJob::for_enquiry(&enquiry, &contact).len(), 1);
    }

    #[test]
    fn pdf_url_prefers_the_collection_specific_entry() {
        let content = json!({
            "pdf_url": "/uploads/docs/general.pdf",
            "pdf_urls": { "M_Collection": "/uploads/docs/m.pdf", "V_Collection": "" }
        });
        assert_eq!(
            ebook_pdf_url(&content, Some(Collection::MCollection)).as_deref(),
            Some("/uploads/docs/m.pdf")
        );
        assert_eq!(
            ebook_pdf_url(&content, Some(Collection::VCollection)).as_deref(),
            Some("/uploads/docs/general.pdf")
        );
        assert_eq!(
            ebook_pdf_url(&content, None).as_deref(),
            Some("/uploads/docs/general.pdf")
        );
        assert_eq!(ebook_pdf_url(&json!({}), None), None);
    }

    #[test]
    fn relative_urls_resolve_against_the_site() {
        assert_eq!(
            absolute_url("https://homes.example.com/", "/uploads/a.pdf").as_deref(),
            Some("https://homes.example.com/uploads/a.pdf")
        );
        assert_eq!(
            absolute_url("https://homes.example.com", "https://cdn.example.com/a.pdf").as_deref(),
            Some("https://cdn.example.com/a.pdf")
        );
        assert_eq!(absolute_url("https://homes.example.com", "javascript:alert(1)"), None);
        assert_eq!(absolute_url("https://homes.example.com", "//evil.example.com/a.pdf"), None);
    }

    #[tokio::test]
    async fn worker_sends_alert_and_ebook() {
        let mailer = Arc::new(RecordingMailer::default());
        let enquiry = ebook_enquiry(Some(Collection::VCollection));
        let jobs = NotificationJob::for_enquiry(&enquiry, &EnquiryForm::Ebook {});

        run_jobs(
            jobs,
            mailer.clone(),
            Some(json!({ "pdf_urls": { "V_Collection": "/uploads/docs/v.pdf" } })),
        )
        .await;

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "sales@example.com");
        assert_eq!(sent[1].to, "buyer@example.com");
        assert!(sent[1].html.contains("v.pdf"));
    }

    #[tokio::test]
    async fn a_failed_alert_does_not_stop_the_ebook() {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail_for: Some("sales@example.com".to_string()),
        });
        let enquiry = ebook_enquiry(None);
        let jobs = NotificationJob::for_enquiry(&enquiry, &EnquiryForm::Ebook {});

        run_jobs(jobs, mailer.clone(), Some(json!({ "pdf_url": "/uploads/docs/g.pdf" }))).await;

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "buyer@example.com");
    }

    #[tokio::test]
    async fn missing_ebook_page_only_skips_the_ebook() {
        let mailer = Arc::new(RecordingMailer::default());
        let enquiry = ebook_enquiry(None);
        let jobs = NotificationJob::for_enquiry(&enquiry, &EnquiryForm::Ebook {});

        run_jobs(jobs, mailer.clone(), None).await;

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "sales@example.com");
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (queue, _receiver) = NotificationQueue::new(1);
        let enquiry = ebook_enquiry(None);
        let job = NotificationJob::EbookDelivery {
            enquiry_id: enquiry.id,
            name: enquiry.name.clone(),
            email: "buyer@example.com".to_string(),
            collection: None,
        };
        assert!(queue.enqueue(job.clone()));
        assert!(!queue.enqueue(job));
    }

    #[test]
    fn closed_queue_reports_the_drop() {
        let (queue, receiver) = NotificationQueue::new(4);
        drop(receiver);
        let enquiry = ebook_enquiry(None);
        let jobs = NotificationJob::for_enquiry(&enquiry, &EnquiryForm::Ebook {});
        assert!(jobs.into_iter().all(|job| !queue.enqueue(job)));
    }
}

use std::sync::Arc;

use crate::config::AppConfig;
use crate::diary::store::{DiaryStore, FileBackend};
use crate::payments::client::{MercadoPago, PaymentClient};
use crate::vision::client::{OpenAiVision, VisionClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub diary: Arc<DiaryStore>,
    pub vision: Arc<dyn VisionClient>,
    pub payments: Arc<dyn PaymentClient>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let diary = Arc::new(DiaryStore::new(
            Box::new(FileBackend::new(&config.diary_path)),
            config.utc_offset,
        ));

        let http = reqwest::Client::new();
        let vision =
            Arc::new(OpenAiVision::new(http.clone(), &config.vision)) as Arc<dyn VisionClient>;
        let payments =
            Arc::new(MercadoPago::new(http, &config.payment)) as Arc<dyn PaymentClient>;

        Ok(Self::from_parts(config, diary, vision, payments))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        diary: Arc<DiaryStore>,
        vision: Arc<dyn VisionClient>,
        payments: Arc<dyn PaymentClient>,
    ) -> Self {
        Self {
            config,
            diary,
            vision,
            payments,
        }
    }

    /// In-memory diary plus canned external clients, for tests.
    pub fn fake() -> Self {
        use axum::async_trait;
        use time::UtcOffset;

        use crate::config::{PaymentConfig, VisionConfig};
        use crate::diary::store::MemoryBackend;
        use crate::payments::client::{ChargeOutcome, ChargeRequest, PaymentError};
        use crate::vision::client::VisionError;
        use crate::vision::dto::NutritionEstimate;

        struct FakeVision;
        #[async_trait]
        impl VisionClient for FakeVision {
            async fn analyze(&self, _image: &str) -> Result<NutritionEstimate, VisionError> {
                Ok(NutritionEstimate {
                    name: "Grilled chicken salad".into(),
                    calories: 320.0,
                    protein: 28.0,
                    carbs: 12.0,
                    fat: 18.0,
                    confidence: 0.9,
                    description: None,
                })
            }
        }

        struct FakePayments;
        #[async_trait]
        impl PaymentClient for FakePayments {
            async fn charge(&self, _req: &ChargeRequest) -> Result<ChargeOutcome, PaymentError> {
                Ok(ChargeOutcome::Approved {
                    payment_id: "fake-payment-1".into(),
                    status: "approved".into(),
                })
            }
        }

        let config = Arc::new(AppConfig {
            diary_path: "unused".into(),
            utc_offset: UtcOffset::UTC,
            daily_calorie_goal: 2000.0,
            vision: VisionConfig {
                api_key: Some("test".into()),
                base_url: "http://localhost".into(),
                model: "gpt-4o".into(),
                max_tokens: 500,
            },
            payment: PaymentConfig {
                access_token: Some("test".into()),
                base_url: "http://localhost".into(),
                amount: 29.90,
                description: "FitFood Premium monthly subscription".into(),
            },
        });

        let diary = Arc::new(DiaryStore::new(
            Box::new(MemoryBackend::default()),
            UtcOffset::UTC,
        ));

        Self::from_parts(
            config,
            diary,
            Arc::new(FakeVision) as Arc<dyn VisionClient>,
            Arc::new(FakePayments) as Arc<dyn PaymentClient>,
        )
    }
}

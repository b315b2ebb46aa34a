// Résumé parsing LLM prompt templates.
// All prompts for the parsing module are defined here.

pub const RESUME_PARSE_SYSTEM: &str = "\
You are a professional resume parser. \
Return only valid JSON with no additional text or formatting.";

pub const RESUME_PARSE_PROMPT: &str = r#"You are a professional resume parser. Analyze the following resume text and extract structured data. Return ONLY a valid JSON object with this exact structure (no additional text, explanations, or markdown formatting):

{
  "personalInfo": {
    "name": "Full Name",
    "email": "email@example.com",
    "phone": "+1 (555) 123-4567",
    "location": "City, State",
    "website": "https://website.com",
    "linkedin": "https://linkedin.com/in/username",
    "github": "https://github.com/username",
    "title": "Professional Title"
  },
  "summary": "Professional summary paragraph",
  "experience": [
    {
      "id": "exp-1",
      "company": "Company Name",
      "position": "Job Title",
      "location": "City, State",
      "startDate": "01/2020",
      "endDate": "12/2023",
      "current": false,
      "description": ["Achievement or responsibility 1", "Achievement or responsibility 2"],
      "technologies": ["Tech1", "Tech2"]
    }
  ],
  "education": [
    {
      "id": "edu-1",
      "institution": "University Name",
      "degree": "Bachelor of Science",
      "field": "Computer Science",
      "location": "City, State",
      "startDate": "09/2016",
      "endDate": "05/2020",
      "gpa": "3.8",
      "achievements": ["Dean's List", "Summa Cum Laude"]
    }
  ],
  "skills": [
    {
      "category": "Programming Languages",
      "skills": ["JavaScript", "Python", "Java"]
    },
    {
      "category": "Frameworks",
      "skills": ["React", "Node.js", "Django"]
    }
  ],
  "projects": [
    {
      "id": "proj-1",
      "name": "Project Name",
      "description": "Brief project description highlighting key features and impact",
      "technologies": ["React", "Node.js", "MongoDB"],
      "link": "https://project-demo.com",
      "github": "https://github.com/user/project",
      "featured": true
    }
  ],
  "achievements": ["Professional achievement 1", "Professional achievement 2"],
  "confidence": {
    "personalInfo": 0.95,
    "summary": 0.85,
    "experience": 0.90,
    "education": 0.88,
    "skills": 0.75,
    "projects": 0.70,
    "overall": 0.84
  }
}

Extract information from this resume text:
{resume_text}"#;

pub const ENHANCE_PROMPT: &str = "\
Based on the following resume data, generate enhanced content for the {section} section.
Make it professional, compelling, and tailored for a portfolio website.

Resume data: {profile_json}

Return only the enhanced content, no explanations.";
